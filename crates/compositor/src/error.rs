//! Compositor error types

use contracts::SensorKind;
use thiserror::Error;

/// Compositor error
///
/// Every variant names the tile or sensor at fault. The main loop skips the cycle and
/// keeps running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("tile '{tile}' has no sample yet")]
    MissingTile { tile: String },

    #[error("tile '{tile}' does not hold a camera image")]
    NotACamera { tile: String },

    #[error("tile '{tile}' is {}x{}, expected {}x{}", actual.0, actual.1, expected.0, expected.1)]
    DimensionMismatch {
        tile: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("tile '{tile}' buffer is {actual} bytes, expected {expected}")]
    BufferSize {
        tile: String,
        expected: usize,
        actual: usize,
    },

    #[error("sensor '{sensor}' holds a {actual} sample, expected {expected}")]
    WrongKind {
        sensor: String,
        expected: SensorKind,
        actual: SensorKind,
    },
}

impl CompositorError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            CompositorError::MissingTile { .. } => "missing_tile",
            CompositorError::NotACamera { .. } => "not_a_camera",
            CompositorError::DimensionMismatch { .. } => "dimension_mismatch",
            CompositorError::BufferSize { .. } => "buffer_size",
            CompositorError::WrongKind { .. } => "wrong_kind",
        }
    }
}

pub type Result<T> = std::result::Result<T, CompositorError>;
