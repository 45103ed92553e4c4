use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] opsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Payload must be a JSON object, e.g. '{{\"name\": \"Alpha\"}}'")]
    PayloadNotAnObject,
    #[error("Entity ID cannot be empty")]
    EmptyEntityId,
    #[error("Invalid conflict ID: {0}")]
    InvalidConflictId(String),
}
