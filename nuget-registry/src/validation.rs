//! # Input Validation
//!
//! Validation for package identifiers arriving on routes and the CLI. Ids end
//! up in storage paths and synthesized URLs, so anything outside the NuGet id
//! grammar is rejected before it reaches a store.

use crate::error::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum package id length accepted by nuget.org.
pub const MAX_PACKAGE_ID_LENGTH: usize = 100;

/// Error types for validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Input too long: {actual} exceeds maximum {max}")]
    TooLong { actual: usize, max: usize },

    #[error("Input too short: {actual} is below minimum {min}")]
    TooShort { actual: usize, min: usize },

    #[error("Invalid characters in input: {input}")]
    InvalidCharacters { input: String },

    #[error("Contains null bytes")]
    NullBytes,

    #[error("Contains control characters")]
    ControlCharacters,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

static PACKAGE_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+([.-][A-Za-z0-9_]+)*$")
        .expect("Package id regex should compile - this is a static pattern")
});

/// Validate a NuGet package id.
///
/// Ids are word characters separated by single `.` or `-`, e.g.
/// `Newtonsoft.Json` or `my-lib_core`. Returns the id unchanged on success.
pub fn validate_package_id(id: &str) -> ValidationResult<String> {
    if id.is_empty() {
        return Err(ValidationError::TooShort { actual: 0, min: 1 });
    }

    if id.len() > MAX_PACKAGE_ID_LENGTH {
        return Err(ValidationError::TooLong {
            actual: id.len(),
            max: MAX_PACKAGE_ID_LENGTH,
        });
    }

    if id.contains('\0') {
        return Err(ValidationError::NullBytes);
    }

    if id.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }

    if !PACKAGE_ID_REGEX.is_match(id) {
        return Err(ValidationError::InvalidCharacters {
            input: id.to_string(),
        });
    }

    Ok(id.to_string())
}

/// [`validate_package_id`] for request and store boundaries: a rejected id
/// is an [`AppError::BadRequest`].
pub(crate) fn checked_package_id(id: &str) -> AppResult<String> {
    validate_package_id(id)
        .map_err(|e| AppError::BadRequest(format!("Invalid package id '{id}': {e}")))
}
