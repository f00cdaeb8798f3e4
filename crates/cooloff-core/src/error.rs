//! Core error types for cooloff-core.
//!
//! Validation errors are caller-facing and recoverable; they are raised
//! before any persistent write. Store errors wrap SQLite failures. Both
//! funnel into [`CoreError`] so callers see a single failure surface.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::intent::IntentStatus;

/// Core error type for cooloff-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-layer errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Persistence-layer errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Record lookup by id came back empty
    #[error("No such record: {0}")]
    NotFound(String),

    /// Store is locked
    #[error("Store is locked")]
    Locked,
}

/// Validation errors raised by repository operations before any write.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Title was empty after trimming
    #[error("Intent title must not be empty")]
    EmptyTitle,

    /// Checkpoint must be strictly after the start time
    #[error("Invalid date range: checkpoint ({checkpoint}) must be after start ({start})")]
    InvalidDateRange {
        start: DateTime<Utc>,
        checkpoint: DateTime<Utc>,
    },

    /// A field value is out of its permitted range
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The intent's current status does not permit the operation
    #[error("Cannot {trigger} an intent in status '{from}'")]
    InvalidStatusTransition {
        from: IntentStatus,
        trigger: &'static str,
    },

    /// The outcome is not accepted by this operation
    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),

    /// Postponing is unavailable for this intent
    #[error("Checkpoint unavailable: {0}")]
    CheckpointUnavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
