//! Application services: validation, ownership checks and transactions on top of
//! the storage traits. The command surface calls only into this layer.

pub mod auth;
pub mod category;
pub mod like;
pub mod member;
pub mod tag;
pub mod template;

use crate::errors::{CodezapError, Result};

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CodezapError::InvalidInput(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_string())
}
