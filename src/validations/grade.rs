use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::utils::validator::{validate_grade_ids, validate_not_blank, validate_object_id};

/// Body of a grade creation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateGrade {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,
    pub subjects: Option<Vec<Uuid>>,
}

/// Query string of a grade listing request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListGrades {
    pub title: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// Path parameters of get/update/delete grade requests.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GradeIdParams {
    #[validate(custom(function = "validate_object_id"))]
    pub grade_id: String,
}

/// Body of a "subjects for grades" lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubjectsForGrades {
    #[validate(
        required,
        length(min = 1),
        custom(function = "validate_grade_ids")
    )]
    pub grade_ids: Option<Vec<String>>,
}

/// Body of a grade update. At least one field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "UpdateGrade::validate_not_empty"))]
pub struct UpdateGrade {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub description: Option<String>,
    pub subjects: Option<Vec<Uuid>>,
}

impl UpdateGrade {
    fn validate_not_empty(&self) -> Result<(), ValidationError> {
        if self.title.is_none() && self.description.is_none() && self.subjects.is_none() {
            return Err(ValidationError::new("min_keys")
                .with_message("at least one field must be provided".into()));
        }
        Ok(())
    }
}
