//! Error types for the access-control core.

use thiserror::Error;

use crate::types::FunctionId;

/// Errors raised by pure model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed claim: {0}")]
    MalformedClaim(String),

    #[error("function {child} cannot have parent {parent}: the parent chain would loop")]
    Cycle { child: FunctionId, parent: FunctionId },

    #[error("function {0} cannot be its own parent")]
    SelfParent(FunctionId),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Input validation errors for administrative requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} exceeds maximum length of {max}")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must not contain whitespace")]
    Whitespace { field: &'static str },

    #[error("command id must not contain '.'")]
    DottedCommand,

    #[error("sort order must not be negative, got {0}")]
    NegativeSortOrder(i32),

    #[error("page index must start at 1, got {0}")]
    PageIndex(u32),

    #[error("page size must be between 1 and {max}, got {got}")]
    PageSize { got: u32, max: u32 },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
