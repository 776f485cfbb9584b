use std::process::ExitCode;
use std::time::Duration;

use argh::FromArgs;
use synth_shortest_prog::{
    search::{search, Outcome},
    target, Error, IsaSubset, Opcode, SearchConfig,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Search for the shortest program over a chosen instruction subset that
/// computes a target function of 32-bit integers.
#[derive(FromArgs)]
struct Arguments {
    /// the function to synthesize: `abs`, `negate`, `identity`, `zero`,
    /// `sign_mask`, `abs_plus_one`, or `max`
    #[argh(option, short = 't', default = "String::from(\"abs\")")]
    target: String,

    /// comma separated opcode names making up the instruction subset
    #[argh(option, default = "String::from(\"set,sub,xor,gt\")")]
    ops: String,

    /// first program length to try, inputs included
    #[argh(option, default = "2")]
    min_length: usize,

    /// last program length to try, inclusive
    #[argh(option, default = "8")]
    max_length: usize,

    /// number of random input/output examples encoded per attempt
    #[argh(option, default = "10")]
    chains: usize,

    /// number of random inputs a found program is checked against
    #[argh(option, default = "10_000")]
    trials: usize,

    /// seed for all random sampling; runs are not reproducible without it
    #[argh(option)]
    seed: Option<u64>,

    /// give up on a length after this many milliseconds of solving
    #[argh(option)]
    timeout_ms: Option<u64>,

    /// print every known opcode and exit
    #[argh(switch)]
    list_ops: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: Arguments) -> Result<bool, Error> {
    let target = target::by_name(&args.target)?;
    let names: Vec<&str> = args
        .ops
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let subset = IsaSubset::from_names(names.as_slice())?;

    let config = SearchConfig {
        num_chains: args.chains,
        min_length: args.min_length,
        max_length: args.max_length,
        validation_trials: args.trials,
        seed: args.seed,
        solver_timeout: args.timeout_ms.map(Duration::from_millis),
    };
    let mut rng = config.rng();

    match search(&target, &subset, &config, &mut rng)? {
        Outcome::Found(solution) => {
            println!(
                "Generated code ({}.{:03}s):\n\n{}",
                solution.solve_time.as_secs(),
                solution.solve_time.subsec_millis(),
                solution.program
            );
            println!("Testing with random values...\n  {}", solution.validation);
            Ok(true)
        }
        Outcome::Exhausted { max_length } => {
            println!("No program of length {} or less found.", max_length);
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    let args: Arguments = argh::from_env();

    if args.list_ops {
        for op in Opcode::ALL {
            println!("{:>2} {:<8} {:?}", op.id(), op.name(), op.layout());
        }
        return ExitCode::SUCCESS;
    }

    init_tracing();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(error = %e, "search aborted");
            ExitCode::from(2)
        }
    }
}
