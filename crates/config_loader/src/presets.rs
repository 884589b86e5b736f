//! Built-in rigs
//!
//! | name | rig |
//! |---|---|
//! | `surround` | four surround cameras, synchronous, 2x2 grid |
//! | `telemetry` | GNSS + IMU dashboard, chase spectator |
//! | `chase-camera` | one roof camera, single view |
//! | `drive` | vehicle only, spectator behind, 10 s |

use contracts::{
    BlueprintFilter, CameraConfig, Mount, PresenterConfig, PresenterType, RigBlueprint, RunConfig,
    SensorKind, SensorSpec, SpectatorConfig, SpectatorMode, SurroundSide, SyncConfig, SyncMode, Transform, ViewConfig,
    ViewMode,
};

const PRESETS: [&str; 4] = ["surround", "telemetry", "chase-camera", "drive"];

pub fn names() -> &'static [&'static str] {
    &PRESETS
}

pub fn by_name(name: &str) -> Option<RigBlueprint> {
    match name {
        "surround" => Some(surround()),
        "telemetry" => Some(telemetry()),
        "chase-camera" => Some(chase_camera()),
        "drive" => Some(drive()),
        _ => None,
    }
}

/// Frame summaries through tracing
fn log_presenter() -> PresenterConfig {
    PresenterConfig {
        name: "log".to_string(),
        presenter_type: PresenterType::Log,
        queue_capacity: 4,
        params: Default::default(),
    }
}

/// Empty rig: default simulator, random `vehicle.*` on autopilot, headless
fn base() -> RigBlueprint {
    RigBlueprint {
        version: Default::default(),
        simulator: Default::default(),
        vehicle: Default::default(),
        sensors: Vec::new(),
        sync: SyncConfig::default(),
        view: ViewConfig::default(),
        presenters: Vec::new(),
        spectator: SpectatorConfig::default(),
        run: RunConfig::default(),
    }
}

/// Four 480x360 cameras around a four-wheeled vehicle, stitched into a 960x720 grid
pub fn surround() -> RigBlueprint {
    let camera = |name: &str, side| SensorSpec {
        name: name.to_string(),
        kind: SensorKind::RgbCamera,
        mount: Mount::Surround { side },
        camera: Some(CameraConfig {
            width_px: 480,
            height_px: 360,
            fov_deg: 90.0,
        }),
        sample_interval_sec: 0.05,
    };

    let mut bp = base();
    bp.vehicle.blueprint = BlueprintFilter {
        pattern: "vehicle.*".to_string(),
        wheels: Some(4),
    };
    bp.sensors = vec![
        camera("front", SurroundSide::Front),
        camera("right", SurroundSide::Right),
        camera("rear", SurroundSide::Rear),
        camera("left", SurroundSide::Left),
    ];
    bp.sync = SyncConfig {
        mode: SyncMode::Synchronous,
        fixed_delta_seconds: 0.05,
        ..Default::default()
    };
    bp.view = ViewConfig {
        title: "Surround View (Cars Only)".to_string(),
        mode: ViewMode::Grid {
            front: "front".to_string(),
            right: "right".to_string(),
            rear: "rear".to_string(),
            left: "left".to_string(),
        },
    };
    bp.presenters.push(log_presenter());
    bp
}

/// GNSS and IMU on the roof, rendered as a text dashboard
pub fn telemetry() -> RigBlueprint {
    let roof = |name: &str, kind| SensorSpec {
        name: name.to_string(),
        kind,
        mount: Mount::Fixed(Transform::at(0.0, 0.0, 2.0)),
        camera: None,
        sample_interval_sec: 0.0,
    };

    let mut bp = base();
    bp.sensors = vec![roof("gnss", SensorKind::Gnss), roof("imu", SensorKind::Imu)];
    bp.view = ViewConfig {
        title: "GNSS & IMU Live Data".to_string(),
        mode: ViewMode::Dashboard {
            gnss: Some("gnss".to_string()),
            imu: Some("imu".to_string()),
        },
    };
    bp.spectator.mode = SpectatorMode::Follow;
    bp.presenters.push(log_presenter());
    bp
}

/// One 800x600 camera above the hood
pub fn chase_camera() -> RigBlueprint {
    let mut bp = base();
    bp.sensors = vec![SensorSpec {
        name: "camera".to_string(),
        kind: SensorKind::RgbCamera,
        mount: Mount::Fixed(Transform::at(1.5, 0.0, 2.4)),
        camera: Some(CameraConfig {
            width_px: 800,
            height_px: 600,
            fov_deg: 90.0,
        }),
        sample_interval_sec: 0.0,
    }];
    bp.view = ViewConfig {
        title: "Camera Feed".to_string(),
        mode: ViewMode::Single {
            camera: "camera".to_string(),
        },
    };
    bp.spectator.mode = SpectatorMode::Behind;
    bp.presenters.push(log_presenter());
    bp
}

/// Vehicle only, driving for ten seconds with the spectator behind it
pub fn drive() -> RigBlueprint {
    let mut bp = base();
    bp.spectator.mode = SpectatorMode::Behind;
    bp.run.duration_sec = Some(10.0);
    bp
}
