//! Error types for opsync-core

use thiserror::Error;

/// Result type alias using opsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in opsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Row-store error (transient, retried by the sync engine)
    #[error("Store error: {0}")]
    Store(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A sync drain is already running
    #[error("Sync already in progress")]
    AlreadyInProgress,

    /// The configured strategy refused to resolve automatically
    #[error("Manual resolution required: {0}")]
    ManualResolutionRequired(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
