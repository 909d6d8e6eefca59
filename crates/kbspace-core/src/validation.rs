//! Validation of administrative inputs.
//!
//! Registry writes are checked here before they reach any store, so both
//! backends reject the same inputs.

use crate::error::ValidationError;

/// Maximum length of a function, command, or role code.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of a display name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a function url.
pub const MAX_URL_LEN: usize = 200;

/// Validate a stable code (function, command, or role id).
pub fn validate_code(field: &'static str, code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_CODE_LEN,
        });
    }
    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::Whitespace { field });
    }
    Ok(())
}

/// Validate a command code.
///
/// Command codes are the last segment of a claim, so they cannot contain `.`.
pub fn validate_command_code(code: &str) -> Result<(), ValidationError> {
    validate_code("command id", code)?;
    if code.contains('.') {
        return Err(ValidationError::DottedCommand);
    }
    Ok(())
}

/// Validate a required free-text field.
pub fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
