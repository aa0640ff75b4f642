use std::sync::Arc;

use tracing::info;

use crate::services::{email::EmailService, mailer::Mailer, tutor_request::TutorRequestService};
use crate::store::TutorRequestStore;

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Tutor request lifecycle operations.
    pub tutor_requests: TutorRequestService,
}

impl AppState {
    /// Creates a new application state with the provided collaborators.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence backend for tutor requests
    /// * `email_service` - Transport used for outgoing notifications
    pub fn new(store: Arc<dyn TutorRequestStore>, email_service: Arc<dyn EmailService>) -> Self {
        info!("Initializing application state");

        Self {
            tutor_requests: TutorRequestService::new(store, Mailer::new(email_service)),
        }
    }
}
