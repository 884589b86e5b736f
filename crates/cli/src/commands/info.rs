//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RigBlueprint;
use serde::Serialize;
use tracing::info;

use super::{load_blueprint, source_label};
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    simulator: SimulatorInfo,
    vehicle: String,
    autopilot: bool,
    sync: SyncInfo,
    view: ViewInfo,
    sensor_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorInfo>,
    presenters: Vec<String>,
    spectator: String,
}

#[derive(Serialize)]
struct SimulatorInfo {
    host: String,
    port: u16,
    timeout_sec: f64,
}

#[derive(Serialize)]
struct SyncInfo {
    mode: String,
    fixed_delta_seconds: f64,
    tick_timeout_ms: u64,
}

#[derive(Serialize)]
struct ViewInfo {
    title: String,
    mode: String,
    sensors: Vec<String>,
}

#[derive(Serialize)]
struct SensorInfo {
    name: String,
    kind: String,
    mount: String,
    sample_interval_sec: f64,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    attributes: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(source = %source_label(&args.source), "Loading configuration info");

    let blueprint = load_blueprint(&args.source)?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &RigBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sensors = if args.sensors {
        blueprint
            .sensors
            .iter()
            .map(|s| SensorInfo {
                name: s.name.clone(),
                kind: s.kind.to_string(),
                mount: format!("{:?}", s.mount),
                sample_interval_sec: s.sample_interval_sec,
                attributes: s.attributes(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        simulator: SimulatorInfo {
            host: blueprint.simulator.host.clone(),
            port: blueprint.simulator.port,
            timeout_sec: blueprint.simulator.timeout_sec,
        },
        vehicle: blueprint.vehicle.blueprint.pattern.clone(),
        autopilot: blueprint.vehicle.autopilot,
        sync: SyncInfo {
            mode: format!("{:?}", blueprint.sync.mode),
            fixed_delta_seconds: blueprint.sync.fixed_delta_seconds,
            tick_timeout_ms: blueprint.sync.tick_timeout_ms,
        },
        view: ViewInfo {
            title: blueprint.view.title.clone(),
            mode: view_kind(blueprint).to_string(),
            sensors: blueprint
                .view
                .mode
                .referenced_sensors()
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
        sensor_count: blueprint.sensors.len(),
        sensors,
        presenters: blueprint.presenters.iter().map(|p| p.name.clone()).collect(),
        spectator: format!("{:?}", blueprint.spectator.mode),
    }
}

fn view_kind(blueprint: &RigBlueprint) -> &'static str {
    match blueprint.view.mode {
        contracts::ViewMode::Grid { .. } => "grid",
        contracts::ViewMode::Single { .. } => "single",
        contracts::ViewMode::Dashboard { .. } => "dashboard",
        contracts::ViewMode::Headless => "headless",
    }
}

fn print_config_info(blueprint: &RigBlueprint, args: &InfoArgs) {
    println!("=== {} ===\n", blueprint.view.title);

    println!("Simulator");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!(
        "   ├─ Server: {}:{}",
        blueprint.simulator.host, blueprint.simulator.port
    );
    println!("   └─ Timeout: {}s", blueprint.simulator.timeout_sec);

    println!("\nVehicle");
    println!("   ├─ Blueprint: {}", blueprint.vehicle.blueprint.pattern);
    println!("   └─ Autopilot: {}", blueprint.vehicle.autopilot);

    println!("\nSensors ({})", blueprint.sensors.len());
    for (i, sensor) in blueprint.sensors.iter().enumerate() {
        let prefix = if i == blueprint.sensors.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        if args.sensors {
            println!(
                "   {} {} ({}, {:?}, every {}s)",
                prefix, sensor.name, sensor.kind, sensor.mount, sensor.sample_interval_sec
            );
        } else {
            println!("   {} {} ({})", prefix, sensor.name, sensor.kind);
        }
    }

    let sync = &blueprint.sync;
    println!("\nSync Settings");
    println!("   ├─ Mode: {:?}", sync.mode);
    if blueprint.is_synchronous() {
        println!("   ├─ Fixed delta: {}s", sync.fixed_delta_seconds);
        println!("   └─ Tick timeout: {}ms", sync.tick_timeout_ms);
    } else {
        println!("   └─ Cycle interval: {}ms", sync.cycle_interval_ms);
    }

    println!("\nView: {}", view_kind(blueprint));
    let referenced = blueprint.view.mode.referenced_sensors();
    if !referenced.is_empty() {
        println!("   └─ Reads: {}", referenced.join(", "));
    }

    if !blueprint.presenters.is_empty() {
        println!("\nPresenters ({})", blueprint.presenters.len());
        for (i, presenter) in blueprint.presenters.iter().enumerate() {
            let prefix = if i == blueprint.presenters.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {} ({:?})",
                prefix, presenter.name, presenter.presenter_type
            );
        }
    }

    println!("\nSpectator: {:?}", blueprint.spectator.mode);
    println!();
}
