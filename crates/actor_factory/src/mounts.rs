//! Sensor mount and spectator placement relative to the vehicle.

use contracts::{Extent, Location, Mount, SurroundSide, Transform};

/// Clearance between the bounding box and a surround camera (m)
const SURROUND_CLEARANCE: f64 = 0.3;

/// Camera height above the bounding box top (m)
const SURROUND_LIFT: f64 = 0.5;

/// Sensor transform relative to the vehicle
pub fn resolve_mount(mount: &Mount, extent: &Extent) -> Transform {
    match mount {
        Mount::Fixed(transform) => *transform,
        Mount::Surround { side } => surround_transform(*side, extent),
    }
}

/// Camera just outside the bounding box on `side`, facing outwards
pub fn surround_transform(side: SurroundSide, extent: &Extent) -> Transform {
    let z = extent.z + SURROUND_LIFT;
    let dx = extent.x + SURROUND_CLEARANCE;
    let dy = extent.y + SURROUND_CLEARANCE;
    match side {
        SurroundSide::Front => Transform::at(dx, 0.0, z),
        SurroundSide::Right => Transform::at(0.0, dy, z).with_yaw(90.0),
        SurroundSide::Rear => Transform::at(-dx, 0.0, z).with_yaw(180.0),
        SurroundSide::Left => Transform::at(0.0, -dy, z).with_yaw(-90.0),
    }
}

/// One-off spectator placement behind and above the vehicle
pub fn spectator_behind(vehicle: &Transform) -> Transform {
    Transform {
        location: vehicle.location.offset(Location {
            x: -4.0,
            y: 0.0,
            z: 2.5,
        }),
        rotation: vehicle.rotation,
    }
}

/// Chase placement: 8 m behind along the heading, 3 m up, looking slightly down
pub fn spectator_follow(vehicle: &Transform) -> Transform {
    let back = vehicle.forward_vector().scaled(-8.0);
    let location = vehicle.location.offset(back).offset(Location {
        x: 0.0,
        y: 0.0,
        z: 3.0,
    });
    Transform {
        location,
        rotation: vehicle.rotation,
    }
    .with_pitch(-10.0)
}
