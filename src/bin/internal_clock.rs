//! Simulate the network and write its activity artifacts.
//!
//! Usage:
//!   internal-clock <seed> <isi> [--config net.json] [--out-dir DIR] [--parallel]
//!
//! Writes `activity.dat`, `raster.dat` and `readout.dat` into the output
//! directory (the working directory by default).

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use internal_clock::prelude::*;

/// Leaky-integrator network with random recurrent inhibition
#[derive(Parser, Debug)]
#[command(name = "internal-clock", version, long_about = None)]
struct Args {
    /// Seed for the random connectivity
    seed: u64,

    /// Reference time step for the readout weights
    #[arg(allow_negative_numbers = true)]
    isi: i64,

    /// JSON file overriding network parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the output files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Update neurons on all cores
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

    // Reject the reference index before spending time on the simulation.
    let isi = usize::try_from(args.isi)
        .ok()
        .filter(|&isi| isi < cfg.steps)
        .ok_or(Error::ReferenceIndexOutOfRange {
            index: args.isi,
            steps: cfg.steps,
        })?;

    info!(?cfg, seed = args.seed, isi, "starting run");

    let graph = ConnectivityGraph::generate(args.seed, cfg.neurons, cfg.connection_prob);
    info!(
        edges = graph.edge_count(),
        mean_in_degree = graph.mean_in_degree(),
        "connectivity ready"
    );

    let tier = if args.parallel {
        ExecutionTier::Parallel
    } else {
        ExecutionTier::Scalar
    };
    let sim = Simulator::new(cfg, &graph)?.with_execution_tier(tier);
    info!(tier = ?sim.execution_tier(), "simulating");
    let z = sim.run();

    let stats = z.stats();
    info!(
        active_events = stats.active_events,
        mean_activity = stats.mean_activity,
        peak_activity = stats.peak_activity,
        silent_steps = stats.silent_steps,
        "trajectory"
    );

    export(&z, isi, &args.out_dir)?;
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
        eprintln!("internal-clock: {e}");
        process::exit(1);
    }
}
