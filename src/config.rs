use rand::{rngs::SmallRng, SeedableRng};
use std::time::Duration;

/// Knobs for the length-increasing search.
///
/// The input count is not configured here; it is the target's arity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Independent input/output examples encoded per attempt.
    pub num_chains: usize,
    /// First program length (inputs included) to try. Raised to
    /// `num_inputs + 1` if smaller.
    pub min_length: usize,
    /// Last program length to try, inclusive.
    pub max_length: usize,
    /// Random inputs used to check a solution after it is found.
    pub validation_trials: usize,
    /// Seed for chain sampling and validation. `None` seeds from entropy, so
    /// runs are not reproducible.
    pub seed: Option<u64>,
    /// Per-attempt solver limit. `None` leaves `check` unbounded, which can
    /// run for a very long time at larger lengths.
    pub solver_timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            num_chains: 10,
            min_length: 2,
            max_length: 8,
            validation_trials: 10_000,
            seed: None,
            solver_timeout: None,
        }
    }
}

impl SearchConfig {
    /// The generator chain sampling and validation draw from.
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }

    /// The lengths to attempt, in order, for a target with `num_inputs`
    /// inputs.
    pub fn lengths(&self, num_inputs: usize) -> std::ops::RangeInclusive<usize> {
        self.min_length.max(num_inputs + 1)..=self.max_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.num_chains, 10);
        assert_eq!(config.lengths(1), 2..=8);
        assert_eq!(config.validation_trials, 10_000);
        assert!(config.solver_timeout.is_none());
    }

    #[test]
    fn lengths_leave_room_for_inputs() {
        let config = SearchConfig {
            min_length: 1,
            max_length: 5,
            ..SearchConfig::default()
        };
        assert_eq!(config.lengths(3), 4..=5);
        assert!(config.lengths(5).is_empty());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        use rand::Rng;

        let config = SearchConfig {
            seed: Some(7),
            ..SearchConfig::default()
        };
        let (mut a, mut b) = (config.rng(), config.rng());
        let a: Vec<i32> = (0..4).map(|_| a.gen()).collect();
        let b: Vec<i32> = (0..4).map(|_| b.gen()).collect();
        assert_eq!(a, b);
    }
}
