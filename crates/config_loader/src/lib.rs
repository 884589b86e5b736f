//! # Config Loader
//!
//! Loads a `RigBlueprint` from TOML / JSON or from a built-in preset, and validates it.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("rig.toml")).unwrap();
//! println!("Sensors: {}", blueprint.sensors.len());
//! ```

mod parser;
pub mod presets;
mod validator;

pub use contracts::RigBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Format is taken from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RigBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<RigBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Built-in preset by name, validated
    pub fn load_preset(name: &str) -> Result<RigBlueprint, ContractError> {
        let blueprint = presets::by_name(name).ok_or_else(|| {
            ContractError::config_validation(
                "preset",
                format!(
                    "unknown preset '{}' (available: {})",
                    name,
                    presets::names().join(", ")
                ),
            )
        })?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Run the validation rules on an already-built blueprint
    pub fn validate(blueprint: &RigBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize RigBlueprint to TOML string
    pub fn to_toml(blueprint: &RigBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RigBlueprint to JSON string
    pub fn to_json(blueprint: &RigBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<RigBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SyncMode, ViewMode};

    const SURROUND_TOML: &str = r#"
[vehicle.blueprint]
pattern = "vehicle.*"
wheels = 4

[sync]
mode = "synchronous"
fixed_delta_seconds = 0.05

[[sensors]]
name = "front"
kind = "rgb_camera"
camera = { width_px = 480, height_px = 360 }
mount = { placement = "surround", side = "front" }

[[sensors]]
name = "right"
kind = "rgb_camera"
camera = { width_px = 480, height_px = 360 }
mount = { placement = "surround", side = "right" }

[[sensors]]
name = "rear"
kind = "rgb_camera"
camera = { width_px = 480, height_px = 360 }
mount = { placement = "surround", side = "rear" }

[[sensors]]
name = "left"
kind = "rgb_camera"
camera = { width_px = 480, height_px = 360 }
mount = { placement = "surround", side = "left" }

[view]
title = "Surround"
mode = { kind = "grid", front = "front", right = "right", rear = "rear", left = "left" }

[[presenters]]
name = "console"
presenter_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(SURROUND_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.sync.mode, SyncMode::Synchronous);
        assert_eq!(bp.sensors.len(), 4);
        assert!(matches!(bp.view.mode, ViewMode::Grid { .. }));
        assert_eq!(bp.presenters[0].queue_capacity, 4);
    }

    #[test]
    fn test_round_trip_toml() {
        for name in presets::names() {
            let bp = ConfigLoader::load_preset(name).unwrap();
            let serialized = ConfigLoader::to_toml(&bp).unwrap();
            let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml)
                .unwrap_or_else(|e| panic!("preset {name}: {e}\n{serialized}"));
            assert_eq!(bp.sensors.len(), bp2.sensors.len());
            assert_eq!(bp.view.mode, bp2.view.mode);
            assert_eq!(bp.run, bp2.run);
        }
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(SURROUND_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.view.title, bp2.view.title);
        assert_eq!(bp.sensors[3].mount, bp2.sensors[3].mount);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[sensors]]
name = "cam"
kind = "rgb_camera"
camera = { width_px = 64, height_px = 48 }

[[sensors]]
name = "cam"
kind = "gnss"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_unknown_preset() {
        let err = ConfigLoader::load_preset("lidar").unwrap_err().to_string();
        assert!(err.contains("available: surround"), "got: {err}");
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.json");
        std::fs::write(&path, ConfigLoader::to_json(&presets::telemetry()).unwrap()).unwrap();
        let bp = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(bp.sensors.len(), 2);

        let yaml = dir.path().join("rig.yaml");
        std::fs::write(&yaml, "sensors: []").unwrap();
        assert!(ConfigLoader::load_from_path(&yaml).is_err());
    }
}
