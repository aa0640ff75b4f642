//! # Tutor Request Documents
//!
//! A [`TutorRequest`] is submitted by a prospective student or guardian and
//! owns one or more [`TutorBlock`]s, each describing a single tutor engagement.
//! Reads that resolve references return the [`PopulatedTutorRequest`] view.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

use super::{GradeRef, RequestStatus, SubjectRef, TutorRef};
use crate::utils::static_object::PHONE_NUMBER_REGEX;
use crate::utils::validator::validate_not_blank;

/// A tutor request as stored, with references kept as ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub district: String,
    pub city: String,
    pub medium: String,
    pub grade: Vec<Uuid>,
    pub status: RequestStatus,
    pub tutors: Vec<TutorBlock>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TutorRequest {
    /// Looks up a block of this request by its id.
    pub fn block_mut(&mut self, block_id: Uuid) -> Option<&mut TutorBlock> {
        self.tutors.iter_mut().find(|block| block.id == block_id)
    }

    #[inline]
    pub fn contains_block(&self, block_id: Uuid) -> bool {
        self.tutors.iter().any(|block| block.id == block_id)
    }
}

/// One tutor engagement within a request. Owned exclusively by its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorBlock {
    pub id: Uuid,
    pub subjects: Vec<Uuid>,
    pub duration: String,
    pub frequency: String,
    pub preferred_tutor_type: String,
    pub assigned_tutor: Option<Uuid>,
}

/// Payload accepted by the create operation. Ids, status and timestamps
/// are assigned when the request is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTutorRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(regex(path = "*PHONE_NUMBER_REGEX"))]
    pub phone_number: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub district: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub city: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub medium: String,
    #[validate(length(min = 1))]
    pub grade: Vec<Uuid>,
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub tutors: Vec<NewTutorBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTutorBlock {
    #[validate(length(min = 1))]
    pub subjects: Vec<Uuid>,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub duration: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub frequency: String,
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub preferred_tutor_type: String,
}

impl NewTutorRequest {
    /// Turns the payload into a fresh `pending` document with newly generated ids.
    ///
    /// Timestamps are truncated to microseconds, the precision PostgreSQL keeps.
    pub fn into_document(self, now: OffsetDateTime) -> TutorRequest {
        let now = now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000));
        TutorRequest {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            district: self.district,
            city: self.city,
            medium: self.medium,
            grade: self.grade,
            status: RequestStatus::default(),
            tutors: self
                .tutors
                .into_iter()
                .map(|block| TutorBlock {
                    id: Uuid::new_v4(),
                    subjects: block.subjects,
                    duration: block.duration,
                    frequency: block.frequency,
                    preferred_tutor_type: block.preferred_tutor_type,
                    assigned_tutor: None,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A tutor request with grade, subjects and assigned tutors resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedTutorRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub district: String,
    pub city: String,
    pub medium: String,
    pub grade: Vec<GradeRef>,
    pub status: RequestStatus,
    pub tutors: Vec<PopulatedTutorBlock>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedTutorBlock {
    pub id: Uuid,
    pub subjects: Vec<SubjectRef>,
    pub duration: String,
    pub frequency: String,
    pub preferred_tutor_type: String,
    pub assigned_tutor: Option<TutorRef>,
}

/// Filter accepted by the query operation. Every present field must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequestFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub medium: Option<String>,
    pub status: Option<RequestStatus>,
}

impl TutorRequestFilter {
    /// Returns true if the request satisfies every field set on this filter.
    pub fn matches(&self, request: &TutorRequest) -> bool {
        fn field_matches(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().is_none_or(|value| value == actual)
        }

        field_matches(&self.name, &request.name)
            && field_matches(&self.email, &request.email)
            && field_matches(&self.district, &request.district)
            && field_matches(&self.city, &request.city)
            && field_matches(&self.medium, &request.medium)
            && self.status.is_none_or(|status| status == request.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> NewTutorRequest {
        NewTutorRequest {
            name: "Nimal Perera".into(),
            email: "nimal@example.com".into(),
            phone_number: "0771234567".into(),
            district: "Colombo".into(),
            city: "Dehiwala".into(),
            medium: "English".into(),
            grade: vec![Uuid::new_v4()],
            tutors: vec![
                NewTutorBlock {
                    subjects: vec![Uuid::new_v4()],
                    duration: "2 hours".into(),
                    frequency: "Weekly".into(),
                    preferred_tutor_type: "Graduate".into(),
                },
                NewTutorBlock {
                    subjects: vec![Uuid::new_v4()],
                    duration: "1 hour".into(),
                    frequency: "Twice a week".into(),
                    preferred_tutor_type: "Undergraduate".into(),
                },
            ],
        }
    }

    #[test]
    fn into_document_assigns_distinct_ids_and_pending_status() {
        let now = OffsetDateTime::now_utc();
        let doc = sample_payload().into_document(now);

        assert_eq!(doc.status, RequestStatus::Pending);
        assert_eq!(doc.tutors.len(), 2);
        assert_ne!(doc.tutors[0].id, doc.tutors[1].id);
        assert!(doc.tutors.iter().all(|b| b.assigned_tutor.is_none()));
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn into_document_truncates_timestamps_to_microseconds() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::nanoseconds(1_123_456_789);
        let doc = sample_payload().into_document(now);

        assert_eq!(doc.created_at.nanosecond(), 123_456_000);
        assert_eq!(doc.created_at.unix_timestamp(), 1);
        assert_eq!(doc.updated_at, doc.created_at);
    }

    #[test]
    fn payload_validation() {
        assert!(sample_payload().validate().is_ok());

        let mut no_blocks = sample_payload();
        no_blocks.tutors.clear();
        let errors = no_blocks.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("tutors"));

        let mut bad_contact = sample_payload();
        bad_contact.email = "not-an-email".into();
        bad_contact.phone_number = "12345".into();
        let errors = bad_contact.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone_number"));

        let mut blank_block = sample_payload();
        blank_block.tutors[1].subjects.clear();
        assert!(blank_block.validate().is_err());
    }

    #[test]
    fn filter_matches_only_set_fields() {
        let doc = sample_payload().into_document(OffsetDateTime::now_utc());

        let by_district = TutorRequestFilter {
            district: Some("Colombo".into()),
            ..Default::default()
        };
        assert!(by_district.matches(&doc));

        let wrong_status = TutorRequestFilter {
            district: Some("Colombo".into()),
            status: Some(RequestStatus::Closed),
            ..Default::default()
        };
        assert!(!wrong_status.matches(&doc));

        assert!(TutorRequestFilter::default().matches(&doc));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let doc = sample_payload().into_document(OffsetDateTime::now_utc());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["phoneNumber"], "0771234567");
        assert_eq!(value["status"], "pending");
        assert!(value["tutors"][0]["assignedTutor"].is_null());
        assert_eq!(value["tutors"][0]["preferredTutorType"], "Graduate");
    }
}
