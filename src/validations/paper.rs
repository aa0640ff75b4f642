use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::SortOrder;
use crate::utils::validator::{validate_not_blank, validate_object_id};

/// Body of a past-paper creation request. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreatePaper {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub medium: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub subject: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub grade: String,
    pub year: f64,
    #[validate(custom(function = "validate_not_blank"))]
    pub url: String,
}

fn default_order() -> SortOrder {
    SortOrder::Desc
}

/// Query string of a paper listing request. `order` defaults to `desc`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListPapers {
    pub title: Option<String>,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
    #[serde(default = "default_order")]
    pub order: SortOrder,
}

/// Path parameters of get/update/delete paper requests.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaperIdParams {
    #[validate(custom(function = "validate_object_id"))]
    pub paper_id: String,
}

/// Body of a paper update. At least one field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "UpdatePaper::validate_not_empty"))]
pub struct UpdatePaper {
    #[validate(custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub medium: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub subject: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub grade: Option<String>,
    pub year: Option<f64>,
    #[validate(custom(function = "validate_not_blank"))]
    pub url: Option<String>,
}

impl UpdatePaper {
    fn validate_not_empty(&self) -> Result<(), ValidationError> {
        let any_set = self.title.is_some()
            || self.medium.is_some()
            || self.subject.is_some()
            || self.grade.is_some()
            || self.year.is_some()
            || self.url.is_some();
        if !any_set {
            return Err(ValidationError::new("min_keys")
                .with_message("at least one field must be provided".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::validations::parse;

    fn paper_body() -> serde_json::Value {
        json!({
            "title": "2019 O/L Mathematics",
            "medium": "Sinhala",
            "subject": "Mathematics",
            "grade": "Grade 11",
            "year": 2019,
            "url": "https://papers.example.lk/2019-ol-maths.pdf",
        })
    }

    #[test]
    fn create_paper_requires_every_field() {
        assert!(parse::<CreatePaper>(paper_body()).is_ok());

        let mut missing_year = paper_body();
        missing_year.as_object_mut().unwrap().remove("year");
        assert!(parse::<CreatePaper>(missing_year).is_err());
    }

    #[test]
    fn paper_year_accepts_any_number() {
        let mut body = paper_body();
        body["year"] = json!(2019.5);
        let paper: CreatePaper = parse(body).unwrap();
        assert_eq!(paper.year, 2019.5);

        let query: ListPapers = parse(json!({ "limit": -5, "page": 0 })).unwrap();
        assert_eq!(query.limit, Some(-5));
        assert!(parse::<ListPapers>(json!({ "page": 1.5 })).is_err());
    }

    #[test]
    fn list_papers_defaults_order_to_desc() {
        let query: ListPapers = parse(json!({ "grade": "Grade 11" })).unwrap();
        assert_eq!(query.order, SortOrder::Desc);

        let query: ListPapers = parse(json!({ "order": "asc" })).unwrap();
        assert_eq!(query.order, SortOrder::Asc);

        assert!(parse::<ListPapers>(json!({ "order": "sideways" })).is_err());
    }

    #[test]
    fn paper_id_must_be_well_formed() {
        assert!(parse::<PaperIdParams>(json!({ "paperId": Uuid::new_v4().to_string() })).is_ok());
        assert!(parse::<PaperIdParams>(json!({ "paperId": "123" })).is_err());
    }

    #[test]
    fn update_paper_needs_one_field() {
        assert!(parse::<UpdatePaper>(json!({ "year": 2020 })).is_ok());
        assert!(parse::<UpdatePaper>(json!({})).is_err());
    }
}
