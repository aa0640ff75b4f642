use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved grade reference, as embedded in populated tutor requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GradeRef {
    pub id: Uuid,
    pub title: String,
}

/// Resolved subject reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectRef {
    pub id: Uuid,
    pub name: String,
}

/// Resolved tutor reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TutorRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
