//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{PresenterType, RigBlueprint, SpectatorMode, ViewMode};
use serde::Serialize;
use tracing::info;

use super::{load_blueprint, source_label};
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    synchronous: bool,
    sensor_count: usize,
    presenter_count: usize,
    view: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let source = source_label(&args.source);
    info!(source = %source, "Validating configuration");

    let result = match load_blueprint(&args.source) {
        Ok(blueprint) => valid_result(source, &blueprint),
        Err(e) => ValidationResult {
            valid: false,
            source,
            error: Some(format!("{:#}", e)),
            warnings: None,
            summary: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn valid_result(source: String, blueprint: &RigBlueprint) -> ValidationResult {
    let warnings = collect_warnings(blueprint);
    ValidationResult {
        valid: true,
        source,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", blueprint.version),
            synchronous: blueprint.is_synchronous(),
            sensor_count: blueprint.sensors.len(),
            presenter_count: blueprint.presenters.len(),
            view: format!("{:?}", blueprint.view.mode),
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RigBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.presenters.is_empty() && blueprint.view.mode != ViewMode::Headless {
        warnings.push("No presenters configured - composed frames will be discarded".to_string());
    }

    if blueprint.view.mode == ViewMode::Headless && !blueprint.sensors.is_empty() {
        warnings.push("Headless view - sensor samples are collected but never composited".to_string());
    }

    let referenced = blueprint.view.mode.referenced_sensors();
    for sensor in &blueprint.sensors {
        if !referenced.contains(&sensor.name.as_str()) && blueprint.view.mode != ViewMode::Headless
        {
            warnings.push(format!(
                "Sensor '{}' is attached but not used by the view",
                sensor.name
            ));
        }
    }

    let file_without_limit = blueprint.presenters.iter().any(|p| {
        p.presenter_type == PresenterType::File && !p.params.contains_key("max_frames")
    });
    if file_without_limit && blueprint.run.max_frames.is_none() && blueprint.run.duration_sec.is_none()
    {
        warnings.push("File presenter without max_frames and no run limit - output grows until stopped".to_string());
    }

    if blueprint.spectator.mode == SpectatorMode::Follow && blueprint.is_synchronous() {
        // Each cycle pays one extra round trip
        warnings.push("Follow spectator adds a simulator call to every tick".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.source);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Synchronous: {}", summary.synchronous);
            println!("  Sensors: {}", summary.sensor_count);
            println!("  Presenters: {}", summary.presenter_count);
            println!("  View: {}", summary.view);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.source);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_have_no_unused_sensors() {
        for name in config_loader::presets::names() {
            let blueprint = config_loader::ConfigLoader::load_preset(name).unwrap();
            let warnings = collect_warnings(&blueprint);
            assert!(
                !warnings.iter().any(|w| w.contains("not used by the view")),
                "{name}: {warnings:?}"
            );
        }
    }

    #[test]
    fn test_missing_presenters_warns() {
        let mut blueprint = config_loader::ConfigLoader::load_preset("chase-camera").unwrap();
        blueprint.presenters.clear();
        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("No presenters")));
    }
}
