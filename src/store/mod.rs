//! # Tutor Request Store
//!
//! Persistence collaborator behind the tutor request service. The store owns
//! document storage and reference resolution ("population"); the service owns
//! the lifecycle rules.
//!
//! ## Backends
//!
//! - [`PgTutorRequestStore`] - PostgreSQL backend built on `sqlx`
//! - [`InMemoryTutorRequestStore`] - Process-local backend for development and tests

mod memory;
mod postgres;

pub use memory::InMemoryTutorRequestStore;
pub use postgres::PgTutorRequestStore;

use std::cmp::Ordering;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    Page, PopulatedTutorRequest, QueryOptions, SortOrder, TutorRequest, TutorRequestFilter,
};

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    /// A grade, subject or tutor reference points at nothing.
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),

    /// The document to save no longer exists.
    #[error("document not found")]
    DocumentNotFound,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store for tutor requests.
///
/// Mutations are plain writes: `save` overwrites the stored document with
/// the given one, so concurrent read-modify-write cycles are last-writer-wins.
#[async_trait]
pub trait TutorRequestStore: Send + Sync {
    /// Inserts a new document. Fails with [`StoreError::MissingReference`]
    /// if any grade or subject reference is unknown.
    async fn create(&self, request: TutorRequest) -> StoreResult<TutorRequest>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<TutorRequest>>;

    /// Finds the request that owns the tutor block with the given id.
    async fn find_by_block_id(&self, block_id: Uuid) -> StoreResult<Option<TutorRequest>>;

    /// Returns one page of documents matching `filter`.
    async fn paginate(
        &self,
        filter: &TutorRequestFilter,
        options: &QueryOptions,
    ) -> StoreResult<Page<TutorRequest>>;

    /// Persists the mutable parts of an existing document (status, block
    /// attributes, assigned tutors) and refreshes `updated_at`. Fails with
    /// [`StoreError::DocumentNotFound`] if the document was removed.
    async fn save(&self, request: &TutorRequest) -> StoreResult<TutorRequest>;

    /// Deletes the document. Returns false if it did not exist.
    async fn remove(&self, id: Uuid) -> StoreResult<bool>;

    /// Resolves grade, subject and tutor references into embedded entities.
    /// References that no longer resolve are dropped.
    async fn populate(&self, request: TutorRequest) -> StoreResult<PopulatedTutorRequest>;

    async fn populate_page(
        &self,
        page: Page<TutorRequest>,
    ) -> StoreResult<Page<PopulatedTutorRequest>> {
        let mut results = Vec::with_capacity(page.results.len());
        for request in page.results {
            results.push(self.populate(request).await?);
        }

        Ok(Page {
            results,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
            total_results: page.total_results,
        })
    }
}

/// Fields a tutor request listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    District,
    City,
    Medium,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(SortField::Name),
            "district" => Some(SortField::District),
            "city" => Some(SortField::City),
            "medium" => Some(SortField::Medium),
            "status" => Some(SortField::Status),
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::District => "district",
            SortField::City => "city",
            SortField::Medium => "medium",
            SortField::Status => "status",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    fn compare(self, a: &TutorRequest, b: &TutorRequest) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::District => a.district.cmp(&b.district),
            SortField::City => a.city.cmp(&b.city),
            SortField::Medium => a.medium.cmp(&b.medium),
            SortField::Status => a.status.cmp(&b.status),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

/// Resolves the requested sort order, dropping unknown fields.
/// Without any usable key the listing is ordered by creation time.
pub(crate) fn sort_spec(options: &QueryOptions) -> Vec<(SortField, SortOrder)> {
    let mut spec: Vec<(SortField, SortOrder)> = options
        .sort_keys()
        .into_iter()
        .filter_map(|(field, order)| match SortField::parse(field) {
            Some(sort_field) => Some((sort_field, order)),
            None => {
                warn!(field, "Ignoring unknown sort field");
                None
            }
        })
        .collect();

    if spec.is_empty() {
        spec.push((SortField::CreatedAt, SortOrder::Asc));
    }
    spec
}
