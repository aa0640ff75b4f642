//! # Health Check Handler
//!
//! Liveness endpoint for load balancers and deployment tooling.

use axum::http::StatusCode;
use tracing::{debug, instrument};

/// Health check endpoint that returns 200 OK.
///
/// Performs no store or mail transport checks.
#[instrument]
pub async fn health_check() -> StatusCode {
    debug!("Health check endpoint accessed");
    StatusCode::OK
}
