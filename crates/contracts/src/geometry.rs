//! Geometry primitives shared with the simulator.
//!
//! Units follow the simulator: meters for locations, degrees for rotations.

use serde::{Deserialize, Serialize};

/// 3D transform: location + rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Location (x, y, z) in meters
    #[serde(default)]
    pub location: Location,

    /// Rotation (pitch, yaw, roll) in degrees
    #[serde(default)]
    pub rotation: Rotation,
}

impl Transform {
    /// Transform at the given location with zero rotation
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            location: Location { x, y, z },
            rotation: Rotation::default(),
        }
    }

    /// Same transform with the given yaw
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.rotation.yaw = yaw;
        self
    }

    /// Same transform with the given pitch
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.rotation.pitch = pitch;
        self
    }

    /// Unit vector the transform is facing (simulator convention: x forward, z up)
    pub fn forward_vector(&self) -> Location {
        let pitch = self.rotation.pitch.to_radians();
        let yaw = self.rotation.yaw.to_radians();
        Location {
            x: pitch.cos() * yaw.cos(),
            y: pitch.cos() * yaw.sin(),
            z: pitch.sin(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn offset(self, other: Location) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Half-size of an actor's bounding box, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Extent {
    /// Roughly a mid-size sedan
    fn default() -> Self {
        Self {
            x: 2.4,
            y: 1.0,
            z: 0.75,
        }
    }
}
