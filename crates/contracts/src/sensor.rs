//! Sensor samples - what a sensor slot holds.
//!
//! `RawSample` is what a simulator sensor hands to its delivery callback;
//! `SensorSample` is the decoded, display-ready form kept in a slot.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor kinds supported by the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    RgbCamera,
    Gnss,
    Imu,
}

impl SensorKind {
    /// Simulator blueprint id for this kind
    pub fn blueprint_id(self) -> &'static str {
        match self {
            SensorKind::RgbCamera => "sensor.camera.rgb",
            SensorKind::Gnss => "sensor.other.gnss",
            SensorKind::Imu => "sensor.other.imu",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::RgbCamera => "rgb_camera",
            SensorKind::Gnss => "gnss",
            SensorKind::Imu => "imu",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded sensor sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSample {
    /// Simulator frame (tick id) that produced the sample
    pub frame: u64,

    /// Simulation time in seconds
    pub timestamp: f64,

    /// Kind-tagged payload
    pub payload: SensorPayload,
}

impl SensorSample {
    pub fn kind(&self) -> SensorKind {
        self.payload.kind()
    }
}

/// Sample payload, one variant per sensor kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SensorPayload {
    /// RGB8 image, row-major, `width * height * 3` bytes
    Camera(ImageData),

    Gnss(GnssData),

    Imu(ImuData),
}

impl SensorPayload {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorPayload::Camera(_) => SensorKind::RgbCamera,
            SensorPayload::Gnss(_) => SensorKind::Gnss,
            SensorPayload::Imu(_) => SensorKind::Imu,
        }
    }
}

/// Tightly packed RGB8 image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

impl ImageData {
    /// Byte length an RGB8 buffer of these dimensions must have
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// True when the buffer length matches the declared dimensions
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == Self::expected_len(self.width, self.height)
    }
}

/// IMU measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    /// Accelerometer (m/s²)
    pub accelerometer: Vector3,

    /// Gyroscope (rad/s)
    pub gyroscope: Vector3,

    /// Compass heading (rad)
    pub compass: f64,
}

/// GNSS fix
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GnssData {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Altitude (meters)
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Undecoded delivery from a simulator sensor
#[derive(Debug, Clone)]
pub struct RawSample {
    pub frame: u64,
    pub timestamp: f64,
    pub payload: RawPayload,
}

/// Undecoded payload
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Simulator-native camera buffer: BGRA8, `width * height * 4` bytes
    Bgra {
        width: u32,
        height: u32,
        data: Bytes,
    },

    Gnss(GnssData),

    Imu(ImuData),
}

impl RawPayload {
    pub fn kind(&self) -> SensorKind {
        match self {
            RawPayload::Bgra { .. } => SensorKind::RgbCamera,
            RawPayload::Gnss(_) => SensorKind::Gnss,
            RawPayload::Imu(_) => SensorKind::Imu,
        }
    }
}
