//! # Tutor Request Handlers
//!
//! HTTP surface of the tutor request lifecycle. Payloads are checked against
//! the schemas in [`crate::validations`] before reaching the service, and
//! every failure is reported through [`AppError`].

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::{debug, instrument};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, NewTutorRequest, Page, PopulatedTutorRequest, TutorRequest};
use crate::validations::tutor_request::{
    AssignTutor, ListTutorRequests, TutorBlockIdParams, TutorRequestIdParams, UpdateStatus,
};

/// Submits a new tutor request.
///
/// POST /api/request-tutor
///
/// # Returns
///
/// - `201 Created` with the stored request
/// - `400 Bad Request` - Malformed payload, rule violation or unknown grade/subject
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn create_tutor_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTutorRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TutorRequest>)> {
    let Json(payload) = payload?;
    payload.validate()?;
    debug!(blocks = payload.tutors.len(), "Tutor request payload accepted");

    let created = state.tutor_requests.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists tutor requests.
///
/// GET /api/request-tutor?district=..&status=..&sortBy=createdAt:desc&limit=10&page=1
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_tutor_requests(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTutorRequests>, QueryRejection>,
) -> AppResult<Json<Page<PopulatedTutorRequest>>> {
    let Query(query) = query?;
    query.validate()?;

    let (filter, options) = query.into_parts();
    let page = state.tutor_requests.query(&filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/request-tutor/{tutorRequestId}
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn get_tutor_request(
    State(state): State<Arc<AppState>>,
    params: Result<Path<TutorRequestIdParams>, PathRejection>,
) -> AppResult<Json<PopulatedTutorRequest>> {
    let Path(params) = params?;
    params.validate()?;

    state
        .tutor_requests
        .get_by_id(params.id()?)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Tutor request not found"))
}

/// DELETE /api/request-tutor/{tutorRequestId}
///
/// Responds with the request as it was before removal.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn delete_tutor_request(
    State(state): State<Arc<AppState>>,
    params: Result<Path<TutorRequestIdParams>, PathRejection>,
) -> AppResult<Json<PopulatedTutorRequest>> {
    let Path(params) = params?;
    params.validate()?;

    let deleted = state.tutor_requests.delete_by_id(params.id()?).await?;
    Ok(Json(deleted))
}

/// PATCH /api/request-tutor/{tutorRequestId}/status
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn update_tutor_request_status(
    State(state): State<Arc<AppState>>,
    params: Result<Path<TutorRequestIdParams>, PathRejection>,
    body: Result<Json<UpdateStatus>, JsonRejection>,
) -> AppResult<Json<PopulatedTutorRequest>> {
    let Path(params) = params?;
    let Json(body) = body?;
    params.validate()?;

    let updated = state
        .tutor_requests
        .update_status(params.id()?, body.status)
        .await?;
    Ok(Json(updated))
}

/// PATCH /api/request-tutor/blocks/{blockId}/assigned-tutor
///
/// Assigns a tutor to one block. The block is looked up across all requests.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn update_assigned_tutor(
    State(state): State<Arc<AppState>>,
    params: Result<Path<TutorBlockIdParams>, PathRejection>,
    body: Result<Json<AssignTutor>, JsonRejection>,
) -> AppResult<Json<TutorRequest>> {
    let Path(params) = params?;
    let Json(body) = body?;
    params.validate()?;
    body.validate()?;

    let updated = state
        .tutor_requests
        .update_assigned_tutor_for_block(params.id()?, body.tutor_id()?)
        .await?;
    Ok(Json(updated))
}
