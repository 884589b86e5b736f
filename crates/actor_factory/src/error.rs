//! Actor Factory error types

use contracts::{ContractError, SensorKind};
use ingestion::IngestionError;
use thiserror::Error;

/// Actor Factory specific error
#[derive(Debug, Error)]
pub enum ActorFactoryError {
    /// Simulator connection error
    #[error("failed to connect to simulator: {message}")]
    ConnectionFailed { message: String },

    /// No vehicle could be spawned
    #[error("failed to spawn vehicle matching '{blueprint}': {message}")]
    SpawnFailed { blueprint: String, message: String },

    /// A sensor could not be attached
    #[error("failed to attach {kind} sensor '{sensor}': {message}")]
    AttachFailed {
        kind: SensorKind,
        sensor: String,
        message: String,
    },

    /// World settings could not be changed
    #[error("failed to apply world settings: {message}")]
    SettingsFailed { message: String },

    /// Destroy error
    #[error("failed to destroy actor {actor_id}: {message}")]
    DestroyFailed { actor_id: u32, message: String },

    /// Wrapped IngestionError
    #[error(transparent)]
    Ingestion(IngestionError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ActorFactoryError {
    /// Create vehicle spawn error
    pub fn spawn_failed(blueprint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpawnFailed {
            blueprint: blueprint.into(),
            message: message.into(),
        }
    }
}

impl From<IngestionError> for ActorFactoryError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::AttachFailed {
                kind,
                sensor,
                message,
            } => Self::AttachFailed {
                kind,
                sensor,
                message,
            },
            other => Self::Ingestion(other),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ActorFactoryError>;
