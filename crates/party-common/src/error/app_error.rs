//! Top-level application error
//!
//! Used by binary startup paths; library crates carry their own typed errors.

use thiserror::Error;

use crate::config::ConfigError;

/// Application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
