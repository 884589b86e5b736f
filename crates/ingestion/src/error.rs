//! Ingestion error types

use contracts::SensorKind;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Simulator refused to create or start a sensor
    #[error("failed to attach {kind} sensor '{sensor}': {message}")]
    AttachFailed {
        kind: SensorKind,
        sensor: String,
        message: String,
    },

    /// A sensor with this name is already attached
    #[error("sensor '{sensor}' is already attached")]
    DuplicateSensor { sensor: String },

    /// Destroying a sensor actor failed
    #[error("failed to detach sensor '{sensor}': {message}")]
    DetachFailed { sensor: String, message: String },

    /// Delivered sample could not be decoded
    #[error("failed to decode sample: {message}")]
    Decode { message: String },
}

impl IngestionError {
    pub fn attach_failed(
        kind: SensorKind,
        sensor: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AttachFailed {
            kind,
            sensor: sensor.into(),
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
