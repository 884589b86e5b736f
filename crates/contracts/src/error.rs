//! Layered error definitions
//!
//! Categorized by source: config / simulator / presenter

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Simulator Errors =====
    /// Connection to the simulator failed or was lost
    #[error("simulator connection error: {message}")]
    SimulatorConnection { message: String },

    /// A simulator RPC failed
    #[error("simulator error during {operation}: {message}")]
    Simulator { operation: String, message: String },

    /// Actor not found
    #[error("actor not found: {actor_id}")]
    ActorNotFound { actor_id: u32 },

    // ===== Presenter Errors =====
    /// Presenter could not show a frame
    #[error("presenter '{presenter}' error: {message}")]
    Presenter { presenter: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create simulator RPC error
    pub fn simulator(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Simulator {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::SimulatorConnection {
            message: message.into(),
        }
    }

    /// Create presenter error
    pub fn presenter(presenter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Presenter {
            presenter: presenter.into(),
            message: message.into(),
        }
    }
}
