//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation, so services can
//! return typed failures and leave the translation to the transport layer.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::store::StoreError;

/// Central application error type that encompasses all possible error conditions.
///
/// Every variant maps to an HTTP-style status code through [`AppError::status_code`].
/// _Db errors are logged automatically, while other errors should be logged at
/// the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid reference: {0}")]
    InvalidReference(&'static str),
}

impl AppError {
    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Malformed(_)
            | AppError::Validation(_)
            | AppError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Human-readable message exposed to clients.
    pub fn message(&self) -> String {
        match self {
            AppError::Db(_) => "Database error".to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.to_string(),
            AppError::Malformed(msg) => msg.clone(),
            AppError::InvalidReference(what) => format!("Referenced {what} does not exist"),
            AppError::Validation(errors) => validation_message(errors),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Db(e) => AppError::Db(e),
            StoreError::MissingReference(what) => AppError::InvalidReference(what),
            StoreError::DocumentNotFound => AppError::NotFound("Tutor request not found"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

/// Joins the offending field paths and their messages into one line,
/// e.g. `"email: email; tutors[0].subjects: length"`.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect_messages("", errors, &mut parts);
    parts.sort();

    if parts.is_empty() {
        "Invalid input".to_string()
    } else {
        parts.join("; ")
    }
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, parts: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                parts.push(format!("{path}: {}", reasons.join(", ")));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, parts),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, parts);
                }
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Db(e) = &self {
            // Log detailed database errors for internal tracking
            error!(?e, "Database error occurred");
        }

        let status = self.status_code();
        let message = self.message();
        let fields = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
            fields,
        });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
