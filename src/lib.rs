//! # TutorMe - Tutoring Marketplace Backend
//!
//! ## Modules
//!
//! - [`config`] - Startup configuration from environment variables
//! - [`handlers`] - HTTP request handlers for various endpoints
//! - [`models`] - Tutor request documents, pagination and shared state
//! - [`services`] - Business logic services (email, tutor requests)
//! - [`store`] - Tutor request persistence backends
//! - [`validations`] - Request schemas for tutor requests, grades and papers
//! - [`utils`] - Utility functions and constants

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;
pub mod validations;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_tutor_request, delete_tutor_request, get_tutor_request, health_check,
    list_tutor_requests, update_assigned_tutor, update_tutor_request_status,
};
use crate::models::AppState;
use crate::services::email::EmailService;
use crate::store::TutorRequestStore;

/// Creates an Axum router from the given store and mail transport.
#[inline]
pub fn app_with_services(
    store: Arc<dyn TutorRequestStore>,
    email_service: Arc<dyn EmailService>,
) -> Router {
    app(Arc::new(AppState::new(store, email_service)))
}

/// Creates an Axum router with application routes and state.
pub fn app(state: Arc<AppState>) -> Router {
    let tutor_request_routes = Router::new()
        .route(
            "/api/request-tutor",
            get(list_tutor_requests).post(create_tutor_request),
        )
        .route(
            "/api/request-tutor/{tutorRequestId}",
            get(get_tutor_request).delete(delete_tutor_request),
        )
        .route(
            "/api/request-tutor/{tutorRequestId}/status",
            patch(update_tutor_request_status),
        )
        .route(
            "/api/request-tutor/blocks/{blockId}/assigned-tutor",
            patch(update_assigned_tutor),
        );

    Router::new()
        .route("/health-check", get(health_check))
        .merge(tutor_request_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
