//! Error types for the pt-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI one surface to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Controller error: {0}")]
    Controller(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pt-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<pt_config::ConfigError> for AppError {
    fn from(err: pt_config::ConfigError) -> Self {
        match err {
            pt_config::ConfigError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<pt_config::ValidationError> for AppError {
    fn from(err: pt_config::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<pt_controls::ControlError> for AppError {
    fn from(err: pt_controls::ControlError) -> Self {
        AppError::Controller(err.to_string())
    }
}

impl From<pt_store::StoreError> for AppError {
    fn from(err: pt_store::StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}
