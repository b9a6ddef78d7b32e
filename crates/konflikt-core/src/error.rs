//! Error types for konflikt-core

use thiserror::Error;

/// Result type alias using konflikt-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in konflikt-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Conflict not found
    #[error("Conflict not found: {0}")]
    NotFound(String),

    /// Conflict is no longer pending
    #[error("Conflict already resolved: {0}")]
    AlreadyResolved(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable storage rejected a write
    #[error("Storage error: {0}")]
    Storage(String),
}
