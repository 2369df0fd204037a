//! Similarity index of a simulated trajectory.
//!
//! Usage:
//!   similarity-index <input> <output-prefix> [--config net.json] [--profile-stride K] [--parallel]
//!
//! Reads `activity.dat` as written by `internal-clock` and writes
//! `<output-prefix>.png` (the `T x T` matrix in 256 gray levels) and
//! `<output-prefix>.dat` (every K-th row of the matrix, for plotting).

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use internal_clock::prelude::*;

/// Cosine similarity between every pair of time points
#[derive(Parser, Debug)]
#[command(name = "similarity-index", version, long_about = None)]
struct Args {
    /// Activity file (one value per line, time-major)
    input: PathBuf,

    /// Prefix for the .png and .dat outputs
    output_prefix: PathBuf,

    /// JSON file with the network size used for the simulation
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plot every K-th row of the matrix
    #[arg(long, default_value_t = DEFAULT_PROFILE_STRIDE)]
    profile_stride: usize,

    /// Compute matrix rows on all cores
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    }
}

fn run(args: Args) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => NetworkConfig::from_json_file(path)?,
        None => NetworkConfig::default(),
    };
    cfg.validate()?;
    if args.profile_stride == 0 {
        return Err(Error::InvalidConfig("profile stride must be >= 1".into()));
    }

    info!(input = %args.input.display(), steps = cfg.steps, neurons = cfg.neurons, "loading activity");
    let z = Trajectory::load_activity(&args.input, cfg.steps, cfg.neurons)?;

    let tier = if args.parallel {
        ExecutionTier::Parallel
    } else {
        ExecutionTier::Scalar
    };
    info!(tier = ?tier.effective(), "computing similarity");
    let analysis = analyze(&z, tier, args.profile_stride);

    analysis.save(&args.output_prefix)?;
    Ok(())
}

fn main() {
    let args = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        error!(error = %e, "run failed");
        // Plain copy for when logging is filtered out.
        eprintln!("similarity-index: {e}");
        process::exit(1);
    }
}
