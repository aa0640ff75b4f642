//! # Request Status Types
//!
//! This module defines the RequestStatus enum that corresponds to the PostgreSQL
//! `tutor_request_status` enum type in the database.

use serde::{Deserialize, Serialize};

/// Lifecycle label of a tutor request.
///
/// Transitions are not constrained: any status may replace any other.
///
/// - `Pending` - Submitted, not yet picked up
/// - `Processing` - Being reviewed, tutors are being sought
/// - `Fulfilled` - Every requested tutor has been assigned
/// - `Closed` - No further action will be taken
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(type_name = "tutor_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Processing,
    Fulfilled,
    Closed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status_str = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Closed => "closed",
        };
        write!(f, "{status_str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_format() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Processing,
            RequestStatus::Fulfilled,
            RequestStatus::Closed,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, status.to_string());
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<RequestStatus>("\"archived\"").is_err());
    }
}
