//! The length-increasing driver: try each program length in turn until one is
//! satisfiable.

use crate::{validate, Encoder, Error, IsaSubset, Program, SearchConfig, Target, Validation, Verdict};
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A program found at some length, with the result of checking it on random
/// inputs. A failed validation does not retract the solution.
#[derive(Debug)]
pub struct Solution {
    pub program: Program,
    pub validation: Validation,
    pub solve_time: Duration,
}

#[derive(Debug)]
pub enum Outcome {
    Found(Solution),
    /// No length up to `max_length` produced a program.
    Exhausted { max_length: usize },
}

/// Attempt a single program length with a fresh solver context.
///
/// Returns `Ok(None)` when the solver proves no program of this length exists
/// or gives up.
pub fn find_solution<T, R>(
    target: &T,
    subset: &IsaSubset,
    length: usize,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<Option<Solution>, Error>
where
    T: Target + ?Sized,
    R: Rng + ?Sized,
{
    target.verify()?;

    let mut z3_config = z3::Config::new();
    z3_config.set_model_generation(true);
    let context = z3::Context::new(&z3_config);

    let mut encoder = Encoder::new(&context, subset, target.arity(), config.num_chains, length)?;
    encoder.add_constraints();
    encoder.add_chain_constraints(target, rng)?;
    if let Some(timeout) = config.solver_timeout {
        encoder.set_timeout(timeout);
    }

    let start = Instant::now();
    let verdict = encoder.check();
    let solve_time = start.elapsed();
    info!(length, elapsed_ms = solve_time.as_millis() as u64, "solver check completed");

    match verdict {
        Verdict::Unsat => {
            info!(length, "unsatisfiable");
            Ok(None)
        }
        Verdict::Unknown(reason) => {
            warn!(length, %reason, "solver returned unknown");
            Ok(None)
        }
        Verdict::Sat => {
            info!(length, "satisfied");
            let model = encoder.model().ok_or(Error::MissingAssignment {
                slot: length - 1,
                var: "model",
            })?;
            let program = encoder.decode(&model)?;
            let validation = validate(&program, target, config.validation_trials, rng)?;
            if validation.all_passed() {
                info!(%validation, "validated on random inputs");
            } else {
                warn!(%validation, "program disagrees with target on random inputs");
            }
            Ok(Some(Solution {
                program,
                validation,
                solve_time,
            }))
        }
    }
}

/// Try every length in `config.lengths(..)` in order and stop at the first
/// one that yields a program.
///
/// Failures confined to one attempt are logged and the search moves on;
/// setup errors are returned.
pub fn search<T, R>(
    target: &T,
    subset: &IsaSubset,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<Outcome, Error>
where
    T: Target + ?Sized,
    R: Rng + ?Sized,
{
    if subset.is_empty() {
        return Err(Error::EmptySubset);
    }
    if config.num_chains == 0 {
        return Err(Error::NoChains);
    }
    target.verify()?;

    for length in config.lengths(target.arity()) {
        info!(length, chains = config.num_chains, "trying length");
        let attempt = settle(length, find_solution(target, subset, length, config, rng))?;
        if let Some(solution) = attempt {
            return Ok(Outcome::Found(solution));
        }
    }

    Ok(Outcome::Exhausted {
        max_length: config.max_length,
    })
}

/// Downgrade a failure confined to one length attempt to "no program".
fn settle(
    length: usize,
    attempt: Result<Option<Solution>, Error>,
) -> Result<Option<Solution>, Error> {
    match attempt {
        Err(e) if e.is_attempt_failure() => {
            warn!(length, error = %e, "attempt failed");
            Ok(None)
        }
        other => other,
    }
}
