//! # sensor-view CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - config and preset loading with validation
//! - the run loop: rig assembly, synchronized compositing, presentation
//! - teardown on quit, Ctrl+C or error

mod cli;
mod commands;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_presets, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "sensor-view starting");

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Presets(args) => run_presets(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
    }

    result
}

/// Initialize logging (and the metrics endpoint for `run`) from CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let metrics_port = match &cli.command {
        Commands::Run(args) if args.metrics_port != 0 && !args.dry_run => Some(args.metrics_port),
        _ => None,
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port,
        default_log_level: default_log_level.to_string(),
    })
}
