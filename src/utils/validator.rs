//! # Text Input Validation Utilities
//!
//! Custom validator functions shared by the request schemas in
//! [`crate::validations`].

use std::borrow::Cow;

use uuid::Uuid;
use validator::ValidationError;

/// Checks that `value` is a well-formed identifier (a UUID).
pub fn validate_object_id(value: &str) -> Result<(), ValidationError> {
    parse_object_id(value, "Invalid ID").map(|_| ())
}

/// Checks that every entry of `values` is a well-formed grade identifier.
pub fn validate_grade_ids(values: &[String]) -> Result<(), ValidationError> {
    values
        .iter()
        .try_for_each(|value| parse_object_id(value, "Invalid grade id").map(|_| ()))
}

/// Checks that a string field is not blank.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("must not be empty")));
    }
    Ok(())
}

fn parse_object_id(value: &str, message: &'static str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value)
        .map_err(|_| ValidationError::new("object_id").with_message(Cow::Borrowed(message)))
}
