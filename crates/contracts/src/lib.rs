//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace: the sensor data
//! model, the rig blueprint, and the traits at the simulator / presenter seams.
//! Business crates depend on this crate only, never the other way around.
//!
//! ## Time Model
//! - `frame` is the simulator frame (tick id) that produced a sample
//! - `timestamp` is simulation time in seconds (f64)

mod blueprint;
mod composite;
mod error;
mod geometry;
mod presenter;
mod runtime;
pub mod schedule;
mod sensor;
mod sensor_name;
mod sensor_source;
mod simulator;
mod snapshot;

pub use blueprint::*;
pub use composite::*;
pub use error::*;
pub use geometry::*;
pub use presenter::{LocalPresenter, Presenter};
pub use runtime::*;
pub use sensor::*;
pub use sensor_name::SensorName;
pub use sensor_source::{DeliveryCallback, SensorSource};
pub use simulator::SimulatorLink;
pub use snapshot::FrameSnapshot;
