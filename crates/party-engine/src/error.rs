//! Engine error types

use party_core::DomainError;
use thiserror::Error;

/// Application layer error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain rule violation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Settings update rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;
