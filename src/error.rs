//! Common error types for sweeparr

use thiserror::Error;

/// Common result type for sweeparr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the per-service clients
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
