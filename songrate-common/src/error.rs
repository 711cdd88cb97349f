//! Common error types for SongRate

use thiserror::Error;

/// Common result type for SongRate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the SongRate crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller's identity is not known to this database
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
