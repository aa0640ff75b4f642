use std::cmp::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{StoreError, StoreResult, TutorRequestStore, sort_spec};
use crate::models::{
    GradeRef, Page, PopulatedTutorBlock, PopulatedTutorRequest, QueryOptions, SortOrder,
    SubjectRef, TutorRef, TutorRequest, TutorRequestFilter,
};

/// Process-local tutor request store.
///
/// Also holds the grade, subject and tutor catalogs that references are
/// checked and resolved against. Used by the development server when no
/// database is configured, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryTutorRequestStore {
    requests: DashMap<Uuid, TutorRequest>,
    grades: DashMap<Uuid, GradeRef>,
    subjects: DashMap<Uuid, SubjectRef>,
    tutors: DashMap<Uuid, TutorRef>,
}

impl InMemoryTutorRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_grade(&self, title: &str) -> GradeRef {
        let grade = GradeRef {
            id: Uuid::new_v4(),
            title: title.to_string(),
        };
        self.grades.insert(grade.id, grade.clone());
        grade
    }

    pub fn insert_subject(&self, name: &str) -> SubjectRef {
        let subject = SubjectRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.subjects.insert(subject.id, subject.clone());
        subject
    }

    pub fn insert_tutor(&self, name: &str, email: &str) -> TutorRef {
        let tutor = TutorRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.tutors.insert(tutor.id, tutor.clone());
        tutor
    }

    /// Fills the catalogs with grades 1 to 13, the common O/L and A/L
    /// subjects and a couple of tutors, logging every id.
    pub fn seed_sample_catalog(&self) {
        for number in 1..=13 {
            let grade = self.insert_grade(&format!("Grade {number}"));
            info!(id = %grade.id, title = %grade.title, "Seeded grade");
        }
        for name in [
            "Mathematics",
            "Science",
            "English",
            "Sinhala",
            "Tamil",
            "History",
            "ICT",
            "Physics",
            "Chemistry",
            "Biology",
            "Combined Mathematics",
        ] {
            let subject = self.insert_subject(name);
            info!(id = %subject.id, name = %subject.name, "Seeded subject");
        }
        for (name, email) in [
            ("Kamal Silva", "kamal.silva@example.com"),
            ("Tharushi Fernando", "tharushi.fernando@example.com"),
        ] {
            let tutor = self.insert_tutor(name, email);
            info!(id = %tutor.id, name = %tutor.name, "Seeded tutor");
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn check_references(&self, request: &TutorRequest) -> StoreResult<()> {
        if request.grade.iter().any(|id| !self.grades.contains_key(id)) {
            return Err(StoreError::MissingReference("grade"));
        }
        for block in &request.tutors {
            if block.subjects.iter().any(|id| !self.subjects.contains_key(id)) {
                return Err(StoreError::MissingReference("subject"));
            }
            if let Some(tutor_id) = block.assigned_tutor
                && !self.tutors.contains_key(&tutor_id)
            {
                return Err(StoreError::MissingReference("tutor"));
            }
        }
        Ok(())
    }
}

fn compare_requests(
    spec: &[(super::SortField, SortOrder)],
    a: &TutorRequest,
    b: &TutorRequest,
) -> Ordering {
    spec.iter()
        .map(|(field, order)| match order {
            SortOrder::Asc => field.compare(a, b),
            SortOrder::Desc => field.compare(b, a),
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.id.cmp(&b.id))
}

#[async_trait]
impl TutorRequestStore for InMemoryTutorRequestStore {
    #[instrument(skip_all, fields(tutor_request_id = %request.id))]
    async fn create(&self, request: TutorRequest) -> StoreResult<TutorRequest> {
        self.check_references(&request)?;
        self.requests.insert(request.id, request.clone());
        debug!("Stored tutor request in memory");
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<TutorRequest>> {
        Ok(self.requests.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_block_id(&self, block_id: Uuid) -> StoreResult<Option<TutorRequest>> {
        Ok(self
            .requests
            .iter()
            .find(|entry| entry.value().contains_block(block_id))
            .map(|entry| entry.value().clone()))
    }

    async fn paginate(
        &self,
        filter: &TutorRequestFilter,
        options: &QueryOptions,
    ) -> StoreResult<Page<TutorRequest>> {
        let mut matching: Vec<TutorRequest> = self
            .requests
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        let spec = sort_spec(options);
        matching.sort_by(|a, b| compare_requests(&spec, a, b));

        let total = matching.len() as u64;
        let offset = usize::try_from(options.offset()).unwrap_or(usize::MAX);
        let results = matching
            .into_iter()
            .skip(offset)
            .take(options.limit() as usize)
            .collect();

        Ok(Page::new(results, options, total))
    }

    #[instrument(skip_all, fields(tutor_request_id = %request.id))]
    async fn save(&self, request: &TutorRequest) -> StoreResult<TutorRequest> {
        self.check_references(request)?;

        let mut entry = self
            .requests
            .get_mut(&request.id)
            .ok_or(StoreError::DocumentNotFound)?;

        let mut saved = request.clone();
        saved.updated_at = OffsetDateTime::now_utc();
        *entry = saved.clone();
        Ok(saved)
    }

    async fn remove(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.requests.remove(&id).is_some())
    }

    async fn populate(&self, request: TutorRequest) -> StoreResult<PopulatedTutorRequest> {
        let grade = request
            .grade
            .iter()
            .filter_map(|id| self.grades.get(id).map(|g| g.value().clone()))
            .collect();

        let tutors = request
            .tutors
            .into_iter()
            .map(|block| PopulatedTutorBlock {
                id: block.id,
                subjects: block
                    .subjects
                    .iter()
                    .filter_map(|id| self.subjects.get(id).map(|s| s.value().clone()))
                    .collect(),
                duration: block.duration,
                frequency: block.frequency,
                preferred_tutor_type: block.preferred_tutor_type,
                assigned_tutor: block
                    .assigned_tutor
                    .and_then(|id| self.tutors.get(&id).map(|t| t.value().clone())),
            })
            .collect();

        Ok(PopulatedTutorRequest {
            id: request.id,
            name: request.name,
            email: request.email,
            phone_number: request.phone_number,
            district: request.district,
            city: request.city,
            medium: request.medium,
            grade,
            status: request.status,
            tutors,
            created_at: request.created_at,
            updated_at: request.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequestStatus, TutorBlock};

    fn request_in(store: &InMemoryTutorRequestStore, district: &str, name: &str) -> TutorRequest {
        let grade = store.insert_grade("Grade 10");
        let subject = store.insert_subject("Mathematics");
        let now = OffsetDateTime::now_utc();
        TutorRequest {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: "0771234567".into(),
            district: district.to_string(),
            city: "City".into(),
            medium: "English".into(),
            grade: vec![grade.id],
            status: RequestStatus::Pending,
            tutors: vec![TutorBlock {
                id: Uuid::new_v4(),
                subjects: vec![subject.id],
                duration: "1 hour".into(),
                frequency: "Weekly".into(),
                preferred_tutor_type: "Any".into(),
                assigned_tutor: None,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn seeded_catalog_covers_all_grades() {
        let store = InMemoryTutorRequestStore::new();
        store.seed_sample_catalog();

        assert_eq!(store.grades.len(), 13);
        assert!(store.subjects.iter().any(|s| s.name == "Combined Mathematics"));
        assert_eq!(store.tutors.len(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_grade() {
        let store = InMemoryTutorRequestStore::new();
        let mut request = request_in(&store, "Colombo", "Amal");
        request.grade.push(Uuid::new_v4());

        let err = store.create(request).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("grade")));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_rejects_unknown_tutor() {
        let store = InMemoryTutorRequestStore::new();
        let mut request = store
            .create(request_in(&store, "Colombo", "Amal"))
            .await
            .unwrap();
        request.tutors[0].assigned_tutor = Some(Uuid::new_v4());

        let err = store.save(&request).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("tutor")));
    }

    #[tokio::test]
    async fn save_after_remove_fails() {
        let store = InMemoryTutorRequestStore::new();
        let request = store
            .create(request_in(&store, "Colombo", "Amal"))
            .await
            .unwrap();
        assert!(store.remove(request.id).await.unwrap());

        let err = store.save(&request).await.unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound));
        assert!(!store.remove(request.id).await.unwrap());
    }

    #[tokio::test]
    async fn finds_parent_by_block_id() {
        let store = InMemoryTutorRequestStore::new();
        let request = store
            .create(request_in(&store, "Kandy", "Kamal"))
            .await
            .unwrap();

        let found = store
            .find_by_block_id(request.tutors[0].id)
            .await
            .unwrap()
            .expect("parent should be found");
        assert_eq!(found.id, request.id);
        assert!(store.find_by_block_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn paginate_filters_sorts_and_pages() {
        let store = InMemoryTutorRequestStore::new();
        for name in ["Chamari", "Amal", "Binara"] {
            store
                .create(request_in(&store, "Colombo", name))
                .await
                .unwrap();
        }
        store
            .create(request_in(&store, "Galle", "Dilan"))
            .await
            .unwrap();

        let filter = TutorRequestFilter {
            district: Some("Colombo".into()),
            ..Default::default()
        };
        let options = QueryOptions {
            sort_by: Some("name:asc".into()),
            limit: Some(2),
            page: Some(1),
        };

        let first = store.paginate(&filter, &options).await.unwrap();
        let names: Vec<&str> = first.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Amal", "Binara"]);
        assert_eq!(first.total_results, 3);
        assert_eq!(first.total_pages, 2);

        let second = store
            .paginate(
                &filter,
                &QueryOptions {
                    page: Some(2),
                    ..options
                },
            )
            .await
            .unwrap();
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].name, "Chamari");
    }

    #[tokio::test]
    async fn populate_resolves_references() {
        let store = InMemoryTutorRequestStore::new();
        let tutor = store.insert_tutor("Ms. Silva", "silva@example.com");
        let mut request = store
            .create(request_in(&store, "Colombo", "Amal"))
            .await
            .unwrap();
        request.tutors[0].assigned_tutor = Some(tutor.id);
        let saved = store.save(&request).await.unwrap();

        let populated = store.populate(saved).await.unwrap();
        assert_eq!(populated.grade[0].title, "Grade 10");
        assert_eq!(populated.tutors[0].subjects[0].name, "Mathematics");
        assert_eq!(populated.tutors[0].assigned_tutor, Some(tutor));
    }
}
