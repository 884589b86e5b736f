//! Presenter error types

use thiserror::Error;

/// Presenter-side errors
#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("failed to create presenter '{name}': {message}")]
    Creation { name: String, message: String },

    #[error("presenter error: {0}")]
    Contract(#[from] contracts::ContractError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PresenterError {
    pub fn creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Creation {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PresenterError>;
