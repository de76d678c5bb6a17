//! CLI for the ruvector-control driver-node search

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use ruvector_control::traits::TracingObserver;
use ruvector_control::{run, CancellationToken};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod loader;
mod output;

#[derive(Parser)]
#[command(
    name = "ruvector-control",
    version,
    about = "Find a minimum set of driver nodes that structurally controls a set of target nodes"
)]
struct Cli {
    /// Edge list, one `source;target` pair per line
    #[arg(short, long)]
    edges: PathBuf,

    /// Target nodes, one label per line
    #[arg(short, long)]
    targets: PathBuf,

    /// Candidate source (driver) nodes, one label per line
    #[arg(short, long)]
    sources: PathBuf,

    /// Parameters JSON (RandomSeed, MaximumPathLength, RankComputations, ...)
    #[arg(short, long)]
    parameters: PathBuf,

    /// Output JSON path [default: <edges>_Output_<timestamp>.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the random seed from the parameters file
    #[arg(long)]
    seed: Option<i64>,

    /// Override the worker count from the parameters file
    #[arg(long)]
    parallelism: Option<i64>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut problem = loader::load_problem(&cli.edges, &cli.targets, &cli.sources, &cli.parameters)?;
    if let Some(seed) = cli.seed {
        problem.parameters.random_seed = seed;
    }
    if let Some(workers) = cli.parallelism {
        problem.parameters.maximum_degree_of_parallelism = workers;
    }
    loader::resolve_seed(&mut problem.parameters);

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| output::default_output_path(&cli.edges, Local::now()));
    output::ensure_writable(&output_path)?;

    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received; finishing in-flight work");
        handle.cancel();
    })
    .context("failed to set Ctrl+C handler")?;

    let result = run(&problem, &TracingObserver, &cancel)?;

    let doc = output::OutputDocument {
        name: output::stem(&cli.edges),
        targets: output::stem(&cli.targets),
        sources: output::stem(&cli.sources),
        parameters: &problem.parameters,
        result: &result,
    };
    match output::write(&output_path, &doc) {
        Ok(()) => info!(path = %output_path.display(), "result written"),
        Err(e) => {
            error!("{e:#}");
            println!("{}", output::render(&doc)?);
        }
    }

    output::print_summary(&result, &output_path);
    Ok(())
}
