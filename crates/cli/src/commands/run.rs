//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use super::{load_blueprint, source_label};
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(source = %source_label(&args.source), "Loading configuration");

    let mut blueprint = load_blueprint(&args.source)?;

    // Apply CLI overrides
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding simulator host from CLI");
        blueprint.simulator.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding simulator port from CLI");
        blueprint.simulator.port = port;
    }

    info!(
        host = %blueprint.simulator.host,
        port = blueprint.simulator.port,
        sensors = blueprint.sensors.len(),
        presenters = blueprint.presenters.len(),
        synchronous = blueprint.is_synchronous(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        mock: args.mock,
        max_frames: if args.max_frames == 0 {
            blueprint.run.max_frames
        } else {
            Some(args.max_frames)
        },
        duration: if args.duration > 0.0 {
            Some(Duration::from_secs_f64(args.duration))
        } else {
            blueprint.run.duration()
        },
        blueprint,
    };

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run()
        .await
        .context("Pipeline execution failed")?;

    stats.print_summary();
    info!("sensor-view finished");
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RigBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!(
        "Simulator: {}:{}",
        blueprint.simulator.host, blueprint.simulator.port
    );
    println!("Vehicle: {}", blueprint.vehicle.blueprint.pattern);
    println!("Sync: {:?}", blueprint.sync.mode);
    println!("View: {} ({:?})", blueprint.view.title, blueprint.view.mode);

    println!("\nSensors ({}):", blueprint.sensors.len());
    for sensor in &blueprint.sensors {
        println!(
            "  - {} ({}) every {}s",
            sensor.name, sensor.kind, sensor.sample_interval_sec
        );
    }

    if !blueprint.presenters.is_empty() {
        println!("\nPresenters ({}):", blueprint.presenters.len());
        for presenter in &blueprint.presenters {
            println!("  - {} ({:?})", presenter.name, presenter.presenter_type);
        }
    }

    println!();
}
