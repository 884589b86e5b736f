//! `presets` command implementation.

use anyhow::{Context, Result};
use config_loader::{presets, ConfigLoader};

use crate::cli::{DumpFormat, PresetsArgs};

/// Execute the `presets` command
pub fn run_presets(args: &PresetsArgs) -> Result<()> {
    match &args.dump {
        Some(name) => {
            let blueprint = ConfigLoader::load_preset(name)
                .with_context(|| format!("Failed to load preset '{}'", name))?;
            let text = match args.format {
                DumpFormat::Toml => ConfigLoader::to_toml(&blueprint),
                DumpFormat::Json => ConfigLoader::to_json(&blueprint),
            }
            .context("Failed to serialize preset")?;
            println!("{}", text);
        }
        None => {
            println!("Built-in presets:\n");
            for name in presets::names() {
                if let Some(blueprint) = presets::by_name(name) {
                    println!(
                        "  {:<14} {} ({} sensors)",
                        name,
                        blueprint.view.title,
                        blueprint.sensors.len()
                    );
                }
            }
            println!("\nRun one with: sensor-view run --preset <name>");
        }
    }
    Ok(())
}
