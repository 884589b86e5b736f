//! Command implementations.

mod info;
mod presets;
mod run;
mod validate;

use anyhow::{Context, Result};
use contracts::RigBlueprint;

use crate::cli::SourceArgs;

pub use info::run_info;
pub use presets::run_presets;
pub use run::run_pipeline;
pub use validate::run_validate;

/// Load the blueprint named by `--config` or `--preset`
fn load_blueprint(source: &SourceArgs) -> Result<RigBlueprint> {
    match (&source.config, &source.preset) {
        (Some(path), _) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        (None, Some(name)) => config_loader::ConfigLoader::load_preset(name)
            .with_context(|| format!("Failed to load preset '{}'", name)),
        (None, None) => anyhow::bail!("Either --config or --preset is required"),
    }
}

/// Human-readable name of the configuration source
fn source_label(source: &SourceArgs) -> String {
    match (&source.config, &source.preset) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(name)) => format!("preset:{}", name),
        (None, None) => "<none>".to_string(),
    }
}
