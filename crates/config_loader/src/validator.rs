//! Configuration validation
//!
//! Field ranges come from the `validator` derives on the blueprint types. Cross-field
//! rules checked here:
//! - sensor names are unique
//! - cameras carry camera settings, other kinds do not
//! - the view only references existing sensors of the right kind
//! - a grid view names four distinct cameras of identical size
//! - presenter names are unique

use std::collections::HashSet;

use contracts::{ContractError, RigBlueprint, SensorKind, SensorSpec, ViewMode};
use validator::Validate;

/// Validate a RigBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_sensor_names(blueprint)?;
    validate_camera_settings(blueprint)?;
    validate_view(blueprint)?;
    validate_presenters(blueprint)?;
    Ok(())
}

fn validate_fields(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

fn validate_sensor_names(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sensor in &blueprint.sensors {
        if !seen.insert(sensor.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sensors[name={}]", sensor.name),
                "duplicate sensor name",
            ));
        }
    }
    Ok(())
}

fn validate_camera_settings(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    for sensor in &blueprint.sensors {
        match (sensor.kind, sensor.camera.is_some()) {
            (SensorKind::RgbCamera, false) => {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].camera", sensor.name),
                    "rgb_camera requires camera settings",
                ));
            }
            (SensorKind::Gnss | SensorKind::Imu, true) => {
                return Err(ContractError::config_validation(
                    format!("sensors[{}].camera", sensor.name),
                    format!("camera settings are not allowed on a {} sensor", sensor.kind),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_view(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    match &blueprint.view.mode {
        ViewMode::Grid { .. } => {
            let names = blueprint.view.mode.referenced_sensors();
            let distinct: HashSet<_> = names.iter().collect();
            if distinct.len() != names.len() {
                return Err(ContractError::config_validation(
                    "view.mode",
                    "grid tiles must name four distinct cameras",
                ));
            }

            let cameras = names
                .iter()
                .map(|name| expect_sensor(blueprint, name, SensorKind::RgbCamera))
                .collect::<Result<Vec<_>, _>>()?;

            let sizes: Vec<_> = cameras
                .iter()
                .filter_map(|spec| spec.camera)
                .map(|c| (c.width_px, c.height_px))
                .collect();
            if let Some(first) = sizes.first() {
                if sizes.iter().any(|size| size != first) {
                    return Err(ContractError::config_validation(
                        "view.mode",
                        "grid cameras must share the same image size",
                    ));
                }
            }
        }
        ViewMode::Single { camera } => {
            expect_sensor(blueprint, camera, SensorKind::RgbCamera)?;
        }
        ViewMode::Dashboard { gnss, imu } => {
            if let Some(name) = gnss {
                expect_sensor(blueprint, name, SensorKind::Gnss)?;
            }
            if let Some(name) = imu {
                expect_sensor(blueprint, name, SensorKind::Imu)?;
            }
        }
        ViewMode::Headless => {}
    }
    Ok(())
}

fn expect_sensor<'a>(
    blueprint: &'a RigBlueprint,
    name: &str,
    kind: SensorKind,
) -> Result<&'a SensorSpec, ContractError> {
    let spec = blueprint.sensor(name).ok_or_else(|| {
        ContractError::config_validation(
            "view.mode",
            format!("view references unknown sensor '{}'", name),
        )
    })?;
    if spec.kind != kind {
        return Err(ContractError::config_validation(
            "view.mode",
            format!("sensor '{}' is a {}, expected {}", name, spec.kind, kind),
        ));
    }
    Ok(spec)
}

fn validate_presenters(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, presenter) in blueprint.presenters.iter().enumerate() {
        if !seen.insert(presenter.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("presenters[{}].name", idx),
                format!("duplicate presenter name '{}'", presenter.name),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use contracts::{CameraConfig, Mount, PresenterConfig, PresenterType};

    fn surround() -> RigBlueprint {
        presets::surround()
    }

    fn error_of(bp: &RigBlueprint) -> String {
        validate(bp).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_presets() {
        for name in presets::names() {
            let bp = presets::by_name(name).unwrap();
            assert!(validate(&bp).is_ok(), "preset {name}: {:?}", validate(&bp));
        }
    }

    #[test]
    fn test_duplicate_sensor_name() {
        let mut bp = surround();
        let dup = bp.sensors[0].clone();
        bp.sensors.push(dup);
        let err = error_of(&bp);
        assert!(err.contains("duplicate sensor name"), "got: {err}");
    }

    #[test]
    fn test_camera_without_settings() {
        let mut bp = surround();
        bp.sensors[1].camera = None;
        let err = error_of(&bp);
        assert!(err.contains("requires camera settings"), "got: {err}");
    }

    #[test]
    fn test_camera_settings_on_gnss() {
        let mut bp = presets::telemetry();
        bp.sensors[0].camera = Some(CameraConfig {
            width_px: 10,
            height_px: 10,
            fov_deg: 90.0,
        });
        let err = error_of(&bp);
        assert!(err.contains("not allowed on a gnss sensor"), "got: {err}");
    }

    #[test]
    fn test_grid_needs_four_cameras() {
        let mut bp = surround();
        bp.sensors.retain(|s| s.name != "rear");
        let err = error_of(&bp);
        assert!(err.contains("unknown sensor 'rear'"), "got: {err}");
    }

    #[test]
    fn test_grid_tiles_distinct() {
        let mut bp = surround();
        bp.view.mode = ViewMode::Grid {
            front: "front".into(),
            right: "front".into(),
            rear: "rear".into(),
            left: "left".into(),
        };
        let err = error_of(&bp);
        assert!(err.contains("four distinct cameras"), "got: {err}");
    }

    #[test]
    fn test_grid_size_mismatch() {
        let mut bp = surround();
        if let Some(camera) = bp.sensors[2].camera.as_mut() {
            camera.width_px = 640;
        }
        let err = error_of(&bp);
        assert!(err.contains("same image size"), "got: {err}");
    }

    #[test]
    fn test_grid_rejects_non_camera() {
        let mut bp = surround();
        bp.sensors[3] = SensorSpec {
            name: "left".into(),
            kind: SensorKind::Imu,
            mount: Mount::default(),
            camera: None,
            sample_interval_sec: 0.0,
        };
        let err = error_of(&bp);
        assert!(err.contains("'left' is a imu, expected rgb_camera"), "got: {err}");
    }

    #[test]
    fn test_dashboard_kind_mismatch() {
        let mut bp = presets::telemetry();
        bp.view.mode = ViewMode::Dashboard {
            gnss: Some("imu".into()),
            imu: None,
        };
        let err = error_of(&bp);
        assert!(err.contains("expected gnss"), "got: {err}");
    }

    #[test]
    fn test_field_ranges() {
        let mut bp = surround();
        bp.sync.fixed_delta_seconds = 5.0;
        let err = error_of(&bp);
        assert!(err.contains("fixed_delta_seconds"), "got: {err}");
    }

    #[test]
    fn test_duplicate_presenter_name() {
        let mut bp = surround();
        bp.presenters = vec![
            PresenterConfig {
                name: "out".into(),
                presenter_type: PresenterType::Log,
                queue_capacity: 4,
                params: Default::default(),
            },
            PresenterConfig {
                name: "out".into(),
                presenter_type: PresenterType::File,
                queue_capacity: 4,
                params: Default::default(),
            },
        ];
        let err = error_of(&bp);
        assert!(err.contains("duplicate presenter name"), "got: {err}");
    }
}
