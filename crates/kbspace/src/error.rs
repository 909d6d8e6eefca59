//! Error types for the access-control facade.

use kbspace_core::CoreError;
use kbspace_perms::PermsError;
use kbspace_store::StoreError;
use thiserror::Error;

/// Errors returned by [`AccessControl`](crate::AccessControl) operations.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No valid credential.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The credential lacks the required claim.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Storage error (including not-found, conflict and allocation failures).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Credential envelope error.
    #[error("credential encoding error: {0}")]
    Encoding(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// The knowledge-base sink rejected the record after allocation.
    #[error("knowledge base was not persisted: {0}")]
    Sink(String),
}

impl AccessError {
    /// HTTP status equivalent.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Unauthenticated => 401,
            AccessError::Forbidden { .. } => 403,
            AccessError::Store(e) => match e {
                StoreError::NotFound { .. } => 404,
                StoreError::Conflict { .. } | StoreError::HasChildren(_) => 409,
                StoreError::Invalid(_) => 422,
                e if e.is_retryable() => 503,
                _ => 500,
            },
            AccessError::Encoding(_) | AccessError::Config(_) | AccessError::Sink(_) => 500,
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AccessError::Store(e) if e.is_retryable())
    }
}

impl From<PermsError> for AccessError {
    fn from(e: PermsError) -> Self {
        match e {
            PermsError::Unauthenticated => AccessError::Unauthenticated,
            PermsError::Forbidden { reason } => AccessError::Forbidden { reason },
            PermsError::Store(e) => AccessError::Store(e),
            PermsError::Encoding(msg) => AccessError::Encoding(msg),
        }
    }
}

impl From<CoreError> for AccessError {
    fn from(e: CoreError) -> Self {
        AccessError::Store(StoreError::Invalid(e))
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, AccessError>;
