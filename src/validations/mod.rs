//! # Request Validation
//!
//! Schemas for inbound request shapes, expressed as `validator`-derived types.
//! [`parse`] is the generic entry point: it turns a raw JSON shape into the
//! normalized schema type or a structured error naming the offending fields.
//!
//! ## Schemas
//!
//! - **Tutor requests** (`tutor_request`) - status/tutor updates, listing queries
//! - **Grades** (`grade`) - create, list, get/update/delete by id, subjects lookup
//! - **Papers** (`paper`) - create, list, get/update/delete by id

pub mod grade;
pub mod paper;
pub mod tutor_request;

use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Deserializes `raw` into the schema `T` and runs its validation rules.
///
/// Unknown keys, missing required keys and type mismatches are reported as
/// [`AppError::Malformed`]; rule violations as [`AppError::Validation`].
pub fn parse<T>(raw: Value) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(raw).map_err(|e| AppError::Malformed(e.to_string()))?;
    value.validate()?;
    Ok(value)
}
