//! Error types for the store module.

use kbspace_core::{CoreError, FunctionId, SequenceName, ValidationError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A referenced function, command, role, grant or pair does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The row being created already exists.
    #[error("{kind} already exists: {id}")]
    Conflict { kind: &'static str, id: String },

    /// Deleting this function would orphan its children.
    #[error("function {0} has children; reparent or cascade explicitly")]
    HasChildren(FunctionId),

    /// Input rejected by the model (validation, cycles).
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The sequence update did not commit; no value was handed out.
    ///
    /// `retryable` is set when the cause was lock contention.
    #[error("allocation from sequence {name} failed: {reason}")]
    AllocationFailed {
        name: SequenceName,
        reason: String,
        retryable: bool,
    },

    /// The sequence has handed out `i64::MAX` and cannot advance.
    #[error("sequence {0} is exhausted")]
    SequenceExhausted(SequenceName),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The blocking worker panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(kind: &'static str, id: impl ToString) -> Self {
        Self::Conflict {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::AllocationFailed { retryable, .. } => *retryable,
            StoreError::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Invalid(CoreError::Validation(e))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
