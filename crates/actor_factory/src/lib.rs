//! # Actor Factory
//!
//! Simulator-side lifecycle of a run.
//!
//! Responsibilities:
//! - Configure the world (synchronous mode, traffic manager) from a `RigBlueprint`
//! - Spawn the vehicle, enable autopilot, resolve sensor mounts and attach sensors
//! - Place the spectator camera
//! - Tear everything down in order through `ShutdownCoordinator`
//! - Provide `SimulatorLink` implementations: the mock simulator and real CARLA
//!
//! ## Feature Flags
//!
//! - `real-carla`: Enable the real CARLA link (requires carla crate)

pub mod error;
pub mod factory;
pub mod mock_sensor;
pub mod mock_simulator;
pub mod mounts;
pub mod shutdown;

#[cfg(feature = "real-carla")]
pub mod carla_link;
#[cfg(feature = "real-carla")]
pub mod carla_sensor_source;
#[cfg(feature = "real-carla")]
pub mod sensor_data_converter;

pub use contracts::{ActorId, RigBlueprint, SensorSource, SimulatorLink};
pub use error::{ActorFactoryError, Result};
pub use factory::{Rig, RigFactory};
pub use mock_sensor::{camera_tint, MockSensor, MockSensorConfig};
pub use mock_simulator::{MockConfig, MockSimulator};
pub use shutdown::ShutdownCoordinator;

#[cfg(feature = "real-carla")]
pub use carla_link::CarlaLink;
#[cfg(feature = "real-carla")]
pub use carla_sensor_source::CarlaSensorSource;
