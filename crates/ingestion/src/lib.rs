//! # Ingestion
//!
//! Sensor delivery side of the pipeline.
//!
//! Responsibilities:
//! - Attach / detach simulator sensors through a `SimulatorLink`
//! - Decode every delivery (BGRA camera buffers to RGB8) on the delivery thread
//! - Keep the latest sample of each sensor in a lock-free `SensorSlot`
//! - Wake the frame synchronizer after every delivery attempt
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::SensorRegistry;
//!
//! let mut registry = SensorRegistry::new();
//! let handle = registry.attach(&link, vehicle, &spec, mount).await?;
//!
//! let slots = registry.slot_set();
//! // ... frame synchronizer reads `slots` every cycle ...
//!
//! registry.detach(&link, &handle).await?;
//! ```

mod decode;
mod error;
mod metrics;
mod registry;
mod slot;

#[cfg(test)]
mod test_link;

pub use decode::{bgra_to_rgb, decode};
pub use error::{IngestionError, Result};
pub use registry::{SensorHandle, SensorRegistry, SlotEntry, SlotSet};
pub use slot::{SensorSlot, SlotStats};
