//! # Tutor Request Service
//!
//! Lifecycle operations over tutor requests: create, query, get, status
//! update, per-block tutor assignment and delete. Persistence is delegated to
//! a [`TutorRequestStore`]; the acknowledgement email is sent from a detached
//! task so its outcome never affects the create call.
//!
//! Read lookups report absence as `None`, while mutations on a missing
//! request fail with [`AppError::NotFound`].

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{Instrument, debug, error, info, info_span, instrument};
use uuid::Uuid;

use super::mailer::Mailer;
use crate::error::{AppError, AppResult};
use crate::models::{
    NewTutorRequest, Page, PopulatedTutorRequest, QueryOptions, RequestStatus, TutorRequest,
    TutorRequestFilter,
};
use crate::store::TutorRequestStore;

pub struct TutorRequestService {
    store: Arc<dyn TutorRequestStore>,
    mailer: Mailer,
}

impl TutorRequestService {
    pub fn new(store: Arc<dyn TutorRequestStore>, mailer: Mailer) -> Self {
        Self { store, mailer }
    }

    /// Persists a new request and schedules its acknowledgement email.
    ///
    /// The payload is expected to be validated already. Returns the stored
    /// document with its generated ids.
    #[instrument(skip_all, fields(recipient = %payload.email))]
    pub async fn create(&self, payload: NewTutorRequest) -> AppResult<TutorRequest> {
        let document = payload.into_document(OffsetDateTime::now_utc());
        let created = self.store.create(document).await?;

        info!(
            tutor_request_id = %created.id,
            blocks = created.tutors.len(),
            "Tutor request created"
        );

        self.spawn_acknowledgement(created.clone());
        Ok(created)
    }

    fn spawn_acknowledgement(&self, request: TutorRequest) {
        let store = Arc::clone(&self.store);
        let mailer = self.mailer.clone();
        let span = info_span!("acknowledgement", tutor_request_id = %request.id);

        tokio::spawn(
            async move {
                let populated = match store.populate(request).await {
                    Ok(populated) => populated,
                    Err(e) => {
                        error!(error = %e, "Failed to load tutor request for acknowledgement");
                        return;
                    }
                };

                match mailer.send_acknowledgement(&populated).await {
                    Ok(()) => debug!("Acknowledgement email sent"),
                    Err(e) => error!(error = %e, "Acknowledgement email was not delivered"),
                }
            }
            .instrument(span),
        );
    }

    #[instrument(skip_all, fields(filter = ?filter, sort_by = ?options.sort_by))]
    pub async fn query(
        &self,
        filter: &TutorRequestFilter,
        options: &QueryOptions,
    ) -> AppResult<Page<PopulatedTutorRequest>> {
        let page = self.store.paginate(filter, options).await?;
        debug!(
            total_results = page.total_results,
            returned = page.results.len(),
            "Tutor requests queried"
        );
        Ok(self.store.populate_page(page).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PopulatedTutorRequest>> {
        match self.store.find_by_id(id).await? {
            Some(request) => Ok(Some(self.store.populate(request).await?)),
            None => Ok(None),
        }
    }

    /// Replaces the status of a request. Any status may follow any other.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> AppResult<PopulatedTutorRequest> {
        let mut request = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Tutor request not found"))?;

        let previous = request.status;
        request.status = status;
        let saved = self.store.save(&request).await?;

        info!(%previous, current = %status, "Tutor request status updated");
        Ok(self.store.populate(saved).await?)
    }

    /// Sets the assigned tutor of one block, located across all requests.
    #[instrument(skip(self))]
    pub async fn update_assigned_tutor_for_block(
        &self,
        block_id: Uuid,
        tutor_id: Uuid,
    ) -> AppResult<TutorRequest> {
        let mut request = self
            .store
            .find_by_block_id(block_id)
            .await?
            .ok_or(AppError::NotFound("Tutor request or tutor block not found"))?;

        let block = request
            .block_mut(block_id)
            .ok_or(AppError::NotFound("Tutor block not found"))?;
        block.assigned_tutor = Some(tutor_id);

        let saved = self.store.save(&request).await?;
        info!(tutor_request_id = %saved.id, "Tutor assigned to block");
        Ok(saved)
    }

    /// Removes a request and returns its state from before the removal.
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<PopulatedTutorRequest> {
        let request = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Tutor request not found"))?;
        let prior = self.store.populate(request).await?;

        if !self.store.remove(id).await? {
            return Err(AppError::NotFound("Tutor request not found"));
        }

        info!("Tutor request deleted");
        Ok(prior)
    }
}
