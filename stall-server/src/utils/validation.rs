//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen for the kitchen display (short lines, large font).

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Counter board message text
pub const MAX_MESSAGE_LEN: usize = 500;

/// Operator names attached to messages
pub const MAX_NAME_LEN: usize = 64;

/// Item ids sent by terminals (availability, stats)
pub const MAX_ITEM_ID_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}
