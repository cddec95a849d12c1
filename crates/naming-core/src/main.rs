//! Naming Game Simulation
//!
//! Runs one variant of the naming game and writes the metric series, the
//! optional interaction log, a run summary and the final state to disk.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use naming_core::model::RunPolicy;
use naming_core::output::{
    self, EventLogger, JsonlMetricsWriter, OutputError, SNAPSHOT_FILE, SUMMARY_FILE,
};
use naming_core::{AdvancedModel, Config, MinimalModel, ModelError};
use naming_events::{ModelSnapshot, RunSummary};

const METRICS_FILE: &str = "metrics.jsonl";
const EVENTS_FILE: &str = "events.jsonl";

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "naming_sim")]
#[command(about = "Naming game simulation on a toroidal grid")]
struct Args {
    /// TOML configuration file (defaults to naming.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Maximum number of steps to simulate
    #[arg(long, global = true)]
    steps: Option<u64>,

    /// Directory for metrics, events and summary files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Also write the per-interaction event log
    #[arg(long, global = true)]
    events: bool,

    /// Stop once consensus is reached
    #[arg(long, global = true)]
    until_consensus: bool,

    /// Steps to run before consensus may end the run
    #[arg(long, global = true)]
    min_steps: Option<u64>,

    #[command(subcommand)]
    model: ModelCommand,
}

#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Committed minority agents and group consensus
    Advanced {
        /// Population size
        #[arg(long)]
        n: Option<u32>,
        /// Share of committed minority agents
        #[arg(long)]
        fraction: Option<f64>,
        /// Adoption propensity of agreeing groups
        #[arg(long)]
        beta: Option<f64>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Largest interacting group, speaker included
        #[arg(long)]
        groups_size: Option<usize>,
    },
    /// Pairwise word invention and negotiation
    Minimal {
        /// Population size
        #[arg(long)]
        n: Option<u32>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Word file with one token per line
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Pick partners from the whole population instead of the cell
        #[arg(long)]
        random_interactions: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] naming_core::config::ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    apply_overrides(&mut config, &args);

    let policy = RunPolicy::from(&config.run);
    let out_dir = config.run.output_dir.clone();
    fs::create_dir_all(&out_dir).map_err(OutputError::from)?;

    println!("Naming Game Simulation");
    println!("======================");
    println!("Model: {}", variant_name(&args.model));
    println!("Seed: {}", config.run.seed);
    println!("Max steps: {}", policy.max_steps);
    if policy.stop_on_consensus {
        println!("Stop on consensus after step {}", policy.min_steps);
    }
    println!("Output: {}", out_dir.display());
    println!();

    let (summary, snapshot) = match args.model {
        ModelCommand::Advanced { .. } => {
            let mut model = AdvancedModel::new(config.advanced.clone(), config.run.seed)?;
            model.add_sink(Box::new(JsonlMetricsWriter::create(out_dir.join(METRICS_FILE))?));
            if config.run.write_events {
                model.set_event_logger(EventLogger::new(out_dir.join(EVENTS_FILE))?);
            }
            let summary = model.run(policy)?;
            (summary, model.snapshot())
        }
        ModelCommand::Minimal { .. } => {
            let mut model = MinimalModel::new(config.minimal.clone(), config.run.seed)?;
            model.add_sink(Box::new(JsonlMetricsWriter::create(out_dir.join(METRICS_FILE))?));
            if config.run.write_events {
                model.set_event_logger(EventLogger::new(out_dir.join(EVENTS_FILE))?);
            }
            let summary = model.run(policy)?;
            (summary, model.snapshot())
        }
    };

    write_outputs(&out_dir, &summary, &snapshot)?;
    print_summary(&summary, &out_dir, config.run.write_events);
    Ok(())
}

/// Command line values take precedence over the configuration file
fn apply_overrides(config: &mut Config, args: &Args) {
    let run = &mut config.run;
    if let Some(seed) = args.seed {
        run.seed = seed;
    }
    if let Some(steps) = args.steps {
        run.steps = steps;
    }
    if let Some(min_steps) = args.min_steps {
        run.min_steps = min_steps;
    }
    if let Some(dir) = &args.output_dir {
        run.output_dir = dir.clone();
    }
    run.write_events |= args.events;
    run.stop_on_consensus |= args.until_consensus;

    match &args.model {
        ModelCommand::Advanced {
            n,
            fraction,
            beta,
            width,
            height,
            groups_size,
        } => {
            let params = &mut config.advanced;
            params.n = n.unwrap_or(params.n);
            params.fraction = fraction.unwrap_or(params.fraction);
            params.beta = beta.unwrap_or(params.beta);
            params.width = width.unwrap_or(params.width);
            params.height = height.unwrap_or(params.height);
            params.groups_size = groups_size.unwrap_or(params.groups_size);
        }
        ModelCommand::Minimal {
            n,
            width,
            height,
            dictionary,
            random_interactions,
        } => {
            let params = &mut config.minimal;
            params.n = n.unwrap_or(params.n);
            params.width = width.unwrap_or(params.width);
            params.height = height.unwrap_or(params.height);
            if dictionary.is_some() {
                params.dictionary = dictionary.clone();
            }
            params.random_interactions |= *random_interactions;
        }
    }
}

fn variant_name(command: &ModelCommand) -> &'static str {
    match command {
        ModelCommand::Advanced { .. } => "advanced",
        ModelCommand::Minimal { .. } => "minimal",
    }
}

fn write_outputs(
    dir: &Path,
    summary: &RunSummary,
    snapshot: &ModelSnapshot,
) -> Result<(), OutputError> {
    output::write_summary(dir, summary)?;
    output::write_snapshot(dir, snapshot)?;
    Ok(())
}

fn print_summary(summary: &RunSummary, dir: &Path, events: bool) {
    println!();
    println!("Simulation complete!");
    println!("  Steps: {}", summary.steps);
    match summary.consensus_step {
        Some(step) => println!("  Consensus reached at step {}", step),
        None => println!("  No consensus reached"),
    }
    for (name, value) in summary.final_metrics.values() {
        println!("  {}: {:.4}", name, value);
    }
    println!("  Elapsed: {} ms", summary.elapsed_ms);
    println!();
    println!("Output files:");
    println!("  {}", dir.join(METRICS_FILE).display());
    if events {
        println!("  {}", dir.join(EVENTS_FILE).display());
    }
    println!("  {}", dir.join(SUMMARY_FILE).display());
    println!("  {}", dir.join(SNAPSHOT_FILE).display());
}
