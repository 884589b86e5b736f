//! RigBlueprint - Config Loader output
//!
//! Describes one run: which simulator to talk to, which vehicle to spawn, which sensors to
//! mount on it, how the main loop is paced, what to composite and where to present it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

use crate::{BlueprintFilter, SensorKind, SpawnPointPolicy, Transform};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete description of a run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RigBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    #[serde(default)]
    #[validate(nested)]
    pub simulator: SimulatorConfig,

    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// Sensors mounted on the vehicle
    #[serde(default)]
    #[validate(nested)]
    pub sensors: Vec<SensorSpec>,

    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    #[validate(nested)]
    pub presenters: Vec<PresenterConfig>,

    #[serde(default)]
    pub spectator: SpectatorConfig,

    #[serde(default)]
    #[validate(nested)]
    pub run: RunConfig,
}

/// Simulator endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimulatorConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// RPC timeout (seconds)
    #[serde(default = "default_timeout_sec")]
    #[validate(range(min = 0.1, max = 600.0))]
    pub timeout_sec: f64,

    #[serde(default = "default_traffic_manager_port")]
    #[validate(range(min = 1))]
    pub traffic_manager_port: u16,
}

impl SimulatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_sec)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_sec: default_timeout_sec(),
            traffic_manager_port: default_traffic_manager_port(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    2000
}

fn default_timeout_sec() -> f64 {
    10.0
}

fn default_traffic_manager_port() -> u16 {
    8000
}

/// Vehicle to spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    #[serde(default)]
    pub blueprint: BlueprintFilter,

    #[serde(default)]
    pub spawn_point: SpawnPointPolicy,

    /// Hand the vehicle to the traffic manager
    #[serde(default = "default_true")]
    pub autopilot: bool,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            blueprint: BlueprintFilter::default(),
            spawn_point: SpawnPointPolicy::Random,
            autopilot: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Sensor attach spec
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SensorSpec {
    /// Unique name, used as the slot key
    #[validate(length(min = 1))]
    pub name: String,

    pub kind: SensorKind,

    #[serde(default)]
    pub mount: Mount,

    /// Camera settings; required for `rgb_camera`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub camera: Option<CameraConfig>,

    /// Seconds between samples (simulator `sensor_tick`); 0 = every tick
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub sample_interval_sec: f64,
}

impl SensorSpec {
    /// Simulator attributes for this sensor's blueprint
    pub fn attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        if let Some(camera) = &self.camera {
            attrs.insert("image_size_x".to_string(), camera.width_px.to_string());
            attrs.insert("image_size_y".to_string(), camera.height_px.to_string());
            attrs.insert("fov".to_string(), camera.fov_deg.to_string());
        }
        if self.sample_interval_sec > 0.0 {
            attrs.insert(
                "sensor_tick".to_string(),
                self.sample_interval_sec.to_string(),
            );
        }
        attrs
    }
}

/// Where a sensor sits on the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Mount {
    /// Explicit transform relative to the vehicle
    Fixed(Transform),

    /// Placed just outside the vehicle bounding box, facing outwards
    Surround { side: SurroundSide },
}

impl Default for Mount {
    fn default() -> Self {
        Mount::Fixed(Transform::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurroundSide {
    Front,
    Right,
    Rear,
    Left,
}

/// Camera image settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct CameraConfig {
    #[validate(range(min = 1, max = 8192))]
    pub width_px: u32,

    #[validate(range(min = 1, max = 8192))]
    pub height_px: u32,

    #[serde(default = "default_fov")]
    #[validate(range(min = 1.0, max = 179.0))]
    pub fov_deg: f64,
}

fn default_fov() -> f64 {
    90.0
}

/// How the main loop is paced against the simulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Client ticks the world; every cycle is a tick barrier
    Synchronous,

    /// Server free-runs; the loop samples slots at a fixed cadence
    #[default]
    Unsynchronized,
}

/// Main loop pacing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    #[serde(default)]
    pub mode: SyncMode,

    /// Simulation step in synchronous mode (seconds)
    #[serde(default = "default_fixed_delta")]
    #[validate(range(min = 0.001, max = 1.0))]
    pub fixed_delta_seconds: f64,

    /// Upper bound for one tick plus its deliveries
    #[serde(default = "default_tick_timeout_ms")]
    #[validate(range(min = 1))]
    pub tick_timeout_ms: u64,

    /// Cycle period in unsynchronized mode
    #[serde(default = "default_cycle_interval_ms")]
    #[validate(range(min = 1))]
    pub cycle_interval_ms: u64,
}

impl SyncConfig {
    pub fn tick_timeout(&self) -> Duration {
        Duration::from_millis(self.tick_timeout_ms)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            fixed_delta_seconds: default_fixed_delta(),
            tick_timeout_ms: default_tick_timeout_ms(),
            cycle_interval_ms: default_cycle_interval_ms(),
        }
    }
}

fn default_fixed_delta() -> f64 {
    0.05
}

fn default_tick_timeout_ms() -> u64 {
    10_000
}

fn default_cycle_interval_ms() -> u64 {
    16
}

/// What to composite every cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Window / output title
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub mode: ViewMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            mode: ViewMode::default(),
        }
    }
}

fn default_title() -> String {
    "Sensor View".to_string()
}

/// Composite layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewMode {
    /// 2x2 stitched grid of four cameras
    Grid {
        front: String,
        right: String,
        rear: String,
        left: String,
    },

    /// One camera passed through
    Single { camera: String },

    /// GNSS + IMU telemetry text dashboard
    Dashboard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gnss: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        imu: Option<String>,
    },

    /// No artifact; the loop only ticks
    #[default]
    Headless,
}

impl ViewMode {
    /// Sensor names the view reads, in layout order
    pub fn referenced_sensors(&self) -> Vec<&str> {
        match self {
            ViewMode::Grid {
                front,
                right,
                rear,
                left,
            } => vec![front.as_str(), right.as_str(), rear.as_str(), left.as_str()],
            ViewMode::Single { camera } => vec![camera.as_str()],
            ViewMode::Dashboard { gnss, imu } => {
                gnss.iter().chain(imu.iter()).map(String::as_str).collect()
            }
            ViewMode::Headless => Vec::new(),
        }
    }
}

/// Presenter output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PresenterConfig {
    #[validate(length(min = 1))]
    pub name: String,

    pub presenter_type: PresenterType,

    /// Frames queued ahead of a slow presenter before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenterType {
    /// Frame summary through tracing
    Log,
    /// PNG (+ JSON for dashboards) files on disk
    File,
}

/// Spectator camera placement
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpectatorConfig {
    #[serde(default)]
    pub mode: SpectatorMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectatorMode {
    #[default]
    Off,
    /// Placed once behind the vehicle after spawn
    Behind,
    /// Chases the vehicle every cycle
    Follow,
}

/// When the main loop stops on its own
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    /// Stop after this many cycles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub max_frames: Option<u64>,

    /// Stop after this much wall-clock time (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.001))]
    pub duration_sec: Option<f64>,
}

impl RunConfig {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_sec.map(Duration::from_secs_f64)
    }
}

impl RigBlueprint {
    pub fn sensor(&self, name: &str) -> Option<&SensorSpec> {
        self.sensors.iter().find(|s| s.name == name)
    }

    pub fn is_synchronous(&self) -> bool {
        self.sync.mode == SyncMode::Synchronous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_attributes() {
        let spec = SensorSpec {
            name: "front".into(),
            kind: SensorKind::RgbCamera,
            mount: Mount::Surround {
                side: SurroundSide::Front,
            },
            camera: Some(CameraConfig {
                width_px: 480,
                height_px: 360,
                fov_deg: 90.0,
            }),
            sample_interval_sec: 0.05,
        };
        let attrs = spec.attributes();
        assert_eq!(attrs["image_size_x"], "480");
        assert_eq!(attrs["image_size_y"], "360");
        assert_eq!(attrs["fov"], "90");
        assert_eq!(attrs["sensor_tick"], "0.05");
    }

    #[test]
    fn grid_references_all_tiles_in_order() {
        let mode = ViewMode::Grid {
            front: "f".into(),
            right: "r".into(),
            rear: "b".into(),
            left: "l".into(),
        };
        assert_eq!(mode.referenced_sensors(), vec!["f", "r", "b", "l"]);
        assert!(ViewMode::Headless.referenced_sensors().is_empty());
    }

    #[test]
    fn mount_deserializes_tagged() {
        let json = r#"{"placement":"surround","side":"left"}"#;
        let mount: Mount = serde_json::from_str(json).unwrap();
        assert_eq!(
            mount,
            Mount::Surround {
                side: SurroundSide::Left
            }
        );

        let json = r#"{"placement":"fixed","location":{"x":1.5,"y":0.0,"z":2.4}}"#;
        let mount: Mount = serde_json::from_str(json).unwrap();
        assert_eq!(mount, Mount::Fixed(Transform::at(1.5, 0.0, 2.4)));
    }

    #[test]
    fn sync_defaults() {
        let sync = SyncConfig::default();
        assert_eq!(sync.mode, SyncMode::Unsynchronized);
        assert_eq!(sync.tick_timeout(), Duration::from_secs(10));
        assert_eq!(sync.fixed_delta_seconds, 0.05);
    }
}
