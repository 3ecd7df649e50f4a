//! Error types for the countdown service.

use thiserror::Error;

use crate::store::StoreError;

/// Main error type for countdown service operations.
#[derive(Error, Debug)]
pub enum CountdownError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid client input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for countdown service operations.
pub type Result<T> = std::result::Result<T, CountdownError>;
