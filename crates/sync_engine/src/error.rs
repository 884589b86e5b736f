//! Sync engine errors

use contracts::{ContractError, TickId};
use thiserror::Error;

/// Frame synchronizer error
///
/// All variants are fatal for the main loop.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The simulator did not return from a tick in time
    #[error("tick did not return within {waited_ms}ms")]
    TickTimeout { waited_ms: u64 },

    /// Due sensors did not deliver for the tick in time
    #[error("tick {tick}: no delivery within {waited_ms}ms from {missing:?}")]
    DeliveryTimeout {
        tick: TickId,
        waited_ms: u64,
        missing: Vec<String>,
    },

    /// The simulator rejected the tick
    #[error("tick failed: {0}")]
    Tick(#[source] ContractError),
}

/// Sync engine Result type alias
pub type Result<T> = std::result::Result<T, SyncError>;
