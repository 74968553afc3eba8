//! nfcpath CLI
//!
//! Command-line interface for NFC antenna link-budget estimation.
//!
//! # Usage
//!
//! ```bash
//! # Annotate a dataset and print summary statistics
//! nfcpath run --input nfc_positions.json --output path_loss_results.json
//!
//! # Statistics of a dataset annotated earlier
//! nfcpath summary --input path_loss_results.json
//!
//! # One antenna box
//! nfcpath compute --x0 0.3 --y0 0.0 --x1 0.7 --y1 0.1
//!
//! # Print an example configuration file
//! nfcpath config
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use nfcpath_core::aggregate::{self, ExecutionMode};
use nfcpath_core::observe::{LogConfig, LogFormat, LogLevel};
use nfcpath_core::prelude::*;

/// NFC antenna link-budget estimation
#[derive(Parser, Debug)]
#[command(name = "nfcpath")]
#[command(author, version, about = "Estimate NFC antenna link budgets across phone models")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log format (compact, pretty, json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate a placement dataset with path loss and received power
    Run(RunArgs),

    /// Summarize a dataset annotated by an earlier run
    Summary {
        /// Annotated dataset (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Estimate a single antenna box
    Compute(ComputeArgs),

    /// Print configuration
    Config {
        /// Print the configuration actually in effect instead of the example
        #[arg(long)]
        resolved: bool,

        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input dataset (JSON array of placements)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output dataset
    #[arg(short, long, default_value = "path_loss_results.json")]
    pub output: PathBuf,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Process records on the calling thread only
    #[arg(long, conflicts_with = "threads")]
    pub sequential: bool,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Number of strongest placements to list
    #[arg(long)]
    pub top: Option<usize>,

    /// Also write the summary report as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ComputeArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub x0: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub y0: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub x1: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub y1: f64,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load the configuration named on the command line, or search the default paths.
pub fn load_config(path: Option<&Path>) -> Result<NfcPathConfig> {
    match path {
        Some(path) => NfcPathConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => NfcPathConfig::load().context("loading configuration"),
    }
}

/// Logging settings: configuration file section overridden by global flags.
pub fn log_config(cli: &Cli, config: &NfcPathConfig) -> LogConfig {
    let mut log = LogConfig::from(&config.logging);
    if let Some(level) = cli.log_level {
        log.level = level;
        log.filter = None;
    }
    if let Some(format) = cli.log_format {
        log.format = format;
    }
    log
}

/// Configuration file a command refers to, if any.
pub fn config_path(command: &Commands) -> Option<&Path> {
    match command {
        Commands::Run(args) => args.config.as_deref(),
        Commands::Compute(args) => args.config.as_deref(),
        Commands::Config { config, .. } => config.as_deref(),
        Commands::Summary { .. } => None,
    }
}

/// Execute a command, writing human-readable output to `out`.
pub fn execute(
    command: Commands,
    config: NfcPathConfig,
    out: &mut impl std::io::Write,
) -> Result<()> {
    match command {
        Commands::Run(args) => run_dataset(args, config, out),
        Commands::Summary { input } => summarize(&input, out),
        Commands::Compute(args) => compute_one(&args, &config, out),
        Commands::Config { resolved, .. } => {
            let yaml = if resolved {
                config.to_yaml()?
            } else {
                NfcPathConfig::example_yaml()
            };
            write!(out, "{yaml}")?;
            Ok(())
        }
    }
}

fn run_dataset(
    args: RunArgs,
    mut config: NfcPathConfig,
    out: &mut impl std::io::Write,
) -> Result<()> {
    if args.sequential {
        config.processing.parallel = false;
    }
    if let Some(threads) = args.threads {
        config.processing.parallel = true;
        config.processing.threads = threads;
    }
    let top = args.top.unwrap_or(config.processing.top_placements);

    let dataset = Dataset::load(&args.input)
        .with_context(|| format!("reading dataset {}", args.input.display()))?;

    let calc = LinkBudgetCalculator::new(config.references, config.device)
        .context("link budget configuration rejected")?;
    let run = aggregate::run_with(
        dataset.placements(),
        &calc,
        ExecutionMode::from(&config.processing),
    );

    dataset
        .write_annotated(&run, &args.output)
        .with_context(|| format!("writing results to {}", args.output.display()))?;

    let report = SummaryReport::from_run(&run, top);
    writeln!(out, "Results saved to {}", args.output.display())?;
    write!(out, "{report}")?;

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }
    Ok(())
}

fn summarize(input: &Path, out: &mut impl std::io::Write) -> Result<()> {
    let dataset =
        Dataset::load(input).with_context(|| format!("reading dataset {}", input.display()))?;
    let report = SummaryReport::from_annotated(dataset.len(), &dataset.summary_of_annotated());
    write!(out, "{report}")?;
    Ok(())
}

fn compute_one(
    args: &ComputeArgs,
    config: &NfcPathConfig,
    out: &mut impl std::io::Write,
) -> Result<()> {
    let bbox = NormalizedBox::new(args.x0, args.y0, args.x1, args.y1);
    let result = nfcpath_core::link_budget::compute(&bbox, &config.references, &config.device)
        .with_context(|| format!("estimating {bbox:?}"))?;

    writeln!(
        out,
        "Antenna:        {:.4} m x {:.4} m ({:.6} m²)",
        result.geometry.width_m, result.geometry.height_m, result.antenna_area_m2
    )?;
    writeln!(out, "Distance:       {:.4} m", result.distance_m)?;
    writeln!(out, "Tx gain:        {:.2} dB", result.tx_gain_db)?;
    writeln!(out, "Rx gain:        {:.2} dB", result.rx_gain_db)?;
    writeln!(out, "Tx power:       {:.2} dB", result.tx_power_db)?;
    writeln!(out, "Path loss:      {:.2} dB", result.path_loss_db)?;
    writeln!(out, "Received power: {:.2} dB", result.received_power_db)?;
    Ok(())
}
