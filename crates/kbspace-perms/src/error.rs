//! Error types for the permissions module.

use kbspace_store::StoreError;
use thiserror::Error;

/// Errors that can occur during issuance and authorization.
#[derive(Debug, Error)]
pub enum PermsError {
    /// No credential, or the credential is not valid.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The credential lacks the claim the operation requires.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Storage failed while resolving grants.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Credential envelope could not be encoded or decoded.
    #[error("credential encoding error: {0}")]
    Encoding(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
