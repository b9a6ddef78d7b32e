use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] konflikt_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Conflict ID cannot be empty")]
    EmptyConflictId,
    #[error("Conflict not found for id/prefix: {0}")]
    ConflictNotFound(String),
    #[error("{0}")]
    AmbiguousConflictId(String),
    #[error("Field '{0}' is not in conflict")]
    UnknownField(String),
    #[error("Merge patch must be a JSON object: {0}")]
    InvalidPatch(String),
    #[error("Unknown strategy '{0}'; expected one of: manual, local-wins, remote-wins")]
    InvalidStrategy(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
