//! # Sync Engine
//!
//! Main-loop pacing and snapshot reads over the ingestion slots.
//!
//! Responsibilities:
//! - Synchronous mode: tick the world, then wait for every sensor due on that tick
//! - Unsynchronized mode: fixed-cadence cycles over a free-running world
//! - Consistent, non-destructive `FrameSnapshot` reads
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::FrameSynchronizer;
//!
//! let mut sync = FrameSynchronizer::from_config(link.clone(), registry.slot_set(), &bp.sync);
//!
//! loop {
//!     let tick = sync.advance().await?;
//!     let snapshot = sync.snapshot();
//!     // compose + present
//! }
//! ```

mod error;
mod synchronizer;

pub use error::{Result, SyncError};
pub use synchronizer::FrameSynchronizer;

pub use contracts::FrameSnapshot;
