//! Schemas for the tutor request endpoints. The create payload itself is
//! [`crate::models::NewTutorRequest`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{QueryOptions, RequestStatus, TutorRequestFilter};
use crate::utils::validator::{validate_not_blank, validate_object_id};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequestIdParams {
    #[validate(custom(function = "validate_object_id"))]
    pub tutor_request_id: String,
}

impl TutorRequestIdParams {
    pub fn id(&self) -> AppResult<Uuid> {
        parse_uuid(&self.tutor_request_id)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TutorBlockIdParams {
    #[validate(custom(function = "validate_object_id"))]
    pub block_id: String,
}

impl TutorBlockIdParams {
    pub fn id(&self) -> AppResult<Uuid> {
        parse_uuid(&self.block_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatus {
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignTutor {
    #[validate(custom(function = "validate_object_id"))]
    pub assigned_tutor: String,
}

impl AssignTutor {
    pub fn tutor_id(&self) -> AppResult<Uuid> {
        parse_uuid(&self.assigned_tutor)
    }
}

/// Query string of the listing endpoint: exact-match filters plus
/// pagination options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListTutorRequests {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub district: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub city: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub medium: Option<String>,
    pub status: Option<RequestStatus>,
    #[validate(custom(function = "validate_not_blank"))]
    pub sort_by: Option<String>,
    #[validate(range(min = 1))]
    pub limit: Option<u32>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
}

impl ListTutorRequests {
    pub fn into_parts(self) -> (TutorRequestFilter, QueryOptions) {
        let filter = TutorRequestFilter {
            name: self.name,
            email: self.email,
            district: self.district,
            city: self.city,
            medium: self.medium,
            status: self.status,
        };
        let options = QueryOptions {
            sort_by: self.sort_by,
            limit: self.limit,
            page: self.page,
        };
        (filter, options)
    }
}

fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid ID"))
}
