use std::path::PathBuf;

use thiserror::Error;

use crate::document::DrawingId;

/// A stored segment blob that could not be decoded.
///
/// Clonable so it can travel inside subscription snapshots next to the
/// records that did decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed segment data: {message}")]
pub struct DecodeError {
    pub message: String,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the drawing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium rejected an insert, update or delete.
    #[error("Failed to write drawing storage: {0}")]
    Write(#[source] std::io::Error),

    /// Reading from the storage medium failed.
    #[error("Failed to read drawing storage: {0}")]
    Read(#[source] std::io::Error),

    #[error("No drawing with id {0}")]
    NotFound(DrawingId),

    #[error("Drawing {id} has malformed segment data: {source}")]
    Deserialization {
        id: DrawingId,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to serialize drawing: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to start storage worker: {0}")]
    Worker(#[source] std::io::Error),

    /// The worker running the operation went away before answering.
    #[error("Drawing store is shut down")]
    Closed,
}

impl From<(DrawingId, DecodeError)> for StoreError {
    fn from((id, source): (DrawingId, DecodeError)) -> Self {
        StoreError::Deserialization { id, source }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by the active drawing session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A save for this drawing is already in progress")]
    SaveInFlight,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
