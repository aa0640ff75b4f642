use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{StoreError, StoreResult, TutorRequestStore, sort_spec};
use crate::models::{
    GradeRef, Page, PopulatedTutorBlock, PopulatedTutorRequest, QueryOptions, RequestStatus,
    SortOrder, SubjectRef, TutorBlock, TutorRef, TutorRequest, TutorRequestFilter,
};

/// PostgreSQL-backed tutor request store.
///
/// A request is spread over `tutor_requests`, `tutor_request_grades`,
/// `tutor_blocks` and `tutor_block_subjects`; positions keep the order of
/// grades, blocks and subjects as submitted.
#[derive(Debug, Clone)]
pub struct PgTutorRequestStore {
    db_pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct TutorRequestRow {
    id: Uuid,
    name: String,
    email: String,
    phone_number: String,
    district: String,
    city: String,
    medium: String,
    status: RequestStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
struct TutorBlockRow {
    id: Uuid,
    tutor_request_id: Uuid,
    duration: String,
    frequency: String,
    preferred_tutor_type: String,
    assigned_tutor_id: Option<Uuid>,
}

/// Translates foreign key violations into [`StoreError::MissingReference`].
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_foreign_key_violation()
    {
        let what = match db_err.constraint() {
            Some("tutor_request_grades_grade_id_fkey") => "grade",
            Some("tutor_block_subjects_subject_id_fkey") => "subject",
            Some("tutor_blocks_assigned_tutor_id_fkey") => "tutor",
            _ => "entity",
        };
        return StoreError::MissingReference(what);
    }
    StoreError::Db(err)
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TutorRequestFilter) {
    let text_fields = [
        ("name", &filter.name),
        ("email", &filter.email),
        ("district", &filter.district),
        ("city", &filter.city),
        ("medium", &filter.medium),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            builder
                .push(format!(" AND {column} = "))
                .push_bind(value.clone());
        }
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
}

impl PgTutorRequestStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Loads full documents for the given ids, in the order of `ids`.
    async fn load_many(&self, ids: &[Uuid]) -> StoreResult<Vec<TutorRequest>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, TutorRequestRow>(
            r#"
            SELECT id, name, email, phone_number, district, city, medium, status,
                   created_at, updated_at
            FROM tutor_requests
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.db_pool)
        .await?;

        let grade_links = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT tutor_request_id, grade_id
            FROM tutor_request_grades
            WHERE tutor_request_id = ANY($1)
            ORDER BY tutor_request_id, position
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.db_pool)
        .await?;

        let block_rows = sqlx::query_as::<_, TutorBlockRow>(
            r#"
            SELECT id, tutor_request_id, duration, frequency, preferred_tutor_type,
                   assigned_tutor_id
            FROM tutor_blocks
            WHERE tutor_request_id = ANY($1)
            ORDER BY tutor_request_id, position
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.db_pool)
        .await?;

        let block_ids: Vec<Uuid> = block_rows.iter().map(|b| b.id).collect();
        let subject_links = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT tutor_block_id, subject_id
            FROM tutor_block_subjects
            WHERE tutor_block_id = ANY($1)
            ORDER BY tutor_block_id, position
            "#,
        )
        .bind(block_ids)
        .fetch_all(&self.db_pool)
        .await?;

        let mut grades_by_request: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (request_id, grade_id) in grade_links {
            grades_by_request.entry(request_id).or_default().push(grade_id);
        }

        let mut subjects_by_block: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (block_id, subject_id) in subject_links {
            subjects_by_block.entry(block_id).or_default().push(subject_id);
        }

        let mut blocks_by_request: HashMap<Uuid, Vec<TutorBlock>> = HashMap::new();
        for row in block_rows {
            blocks_by_request
                .entry(row.tutor_request_id)
                .or_default()
                .push(TutorBlock {
                    id: row.id,
                    subjects: subjects_by_block.remove(&row.id).unwrap_or_default(),
                    duration: row.duration,
                    frequency: row.frequency,
                    preferred_tutor_type: row.preferred_tutor_type,
                    assigned_tutor: row.assigned_tutor_id,
                });
        }

        let mut by_id: HashMap<Uuid, TutorRequest> = rows
            .into_iter()
            .map(|row| {
                let request = TutorRequest {
                    id: row.id,
                    name: row.name,
                    email: row.email,
                    phone_number: row.phone_number,
                    district: row.district,
                    city: row.city,
                    medium: row.medium,
                    grade: grades_by_request.remove(&row.id).unwrap_or_default(),
                    status: row.status,
                    tutors: blocks_by_request.remove(&row.id).unwrap_or_default(),
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                };
                (request.id, request)
            })
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[async_trait]
impl TutorRequestStore for PgTutorRequestStore {
    #[instrument(skip_all, fields(tutor_request_id = %request.id))]
    async fn create(&self, request: TutorRequest) -> StoreResult<TutorRequest> {
        let mut tx = self.db_pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tutor_requests (id, name, email, phone_number, district, city, medium,
                                        status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.district)
        .bind(&request.city)
        .bind(&request.medium)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, grade_id) in request.grade.iter().enumerate() {
            sqlx::query(
                "INSERT INTO tutor_request_grades (tutor_request_id, grade_id, position) VALUES ($1, $2, $3)",
            )
            .bind(request.id)
            .bind(grade_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        for (position, block) in request.tutors.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO tutor_blocks (id, tutor_request_id, position, duration, frequency,
                                          preferred_tutor_type, assigned_tutor_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(block.id)
            .bind(request.id)
            .bind(position as i32)
            .bind(&block.duration)
            .bind(&block.frequency)
            .bind(&block.preferred_tutor_type)
            .bind(block.assigned_tutor)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

            for (subject_position, subject_id) in block.subjects.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO tutor_block_subjects (tutor_block_id, subject_id, position) VALUES ($1, $2, $3)",
                )
                .bind(block.id)
                .bind(subject_id)
                .bind(subject_position as i32)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;
            }
        }

        tx.commit().await?;
        debug!("Inserted tutor request");
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<TutorRequest>> {
        Ok(self.load_many(&[id]).await?.pop())
    }

    async fn find_by_block_id(&self, block_id: Uuid) -> StoreResult<Option<TutorRequest>> {
        let parent_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT tutor_request_id FROM tutor_blocks WHERE id = $1",
        )
        .bind(block_id)
        .fetch_optional(&self.db_pool)
        .await?;

        match parent_id {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip_all)]
    async fn paginate(
        &self,
        filter: &TutorRequestFilter,
        options: &QueryOptions,
    ) -> StoreResult<Page<TutorRequest>> {
        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM tutor_requests WHERE TRUE",
        );
        push_filter(&mut count_query, filter);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await?;

        let mut ids_query = QueryBuilder::<Postgres>::new("SELECT id FROM tutor_requests WHERE TRUE");
        push_filter(&mut ids_query, filter);
        ids_query.push(" ORDER BY ");
        for (field, order) in sort_spec(options) {
            let direction = match order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            ids_query.push(format!("{} {direction}, ", field.column()));
        }
        ids_query
            .push("id ASC LIMIT ")
            .push_bind(i64::from(options.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(options.offset()).unwrap_or(i64::MAX));

        let ids = ids_query
            .build_query_scalar::<Uuid>()
            .fetch_all(&self.db_pool)
            .await?;
        debug!(total, page_len = ids.len(), "Fetched tutor request page");

        let results = self.load_many(&ids).await?;
        Ok(Page::new(results, options, u64::try_from(total).unwrap_or(0)))
    }

    #[instrument(skip_all, fields(tutor_request_id = %request.id))]
    async fn save(&self, request: &TutorRequest) -> StoreResult<TutorRequest> {
        let mut tx = self.db_pool.begin().await?;

        let updated_at = sqlx::query_scalar::<_, OffsetDateTime>(
            r#"
            UPDATE tutor_requests
            SET name = $2, email = $3, phone_number = $4, district = $5, city = $6,
                medium = $7, status = $8, updated_at = now()
            WHERE id = $1
            RETURNING updated_at
            "#,
        )
        .bind(request.id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.district)
        .bind(&request.city)
        .bind(&request.medium)
        .bind(request.status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::DocumentNotFound)?;

        for block in &request.tutors {
            sqlx::query(
                r#"
                UPDATE tutor_blocks
                SET duration = $3, frequency = $4, preferred_tutor_type = $5,
                    assigned_tutor_id = $6
                WHERE id = $1 AND tutor_request_id = $2
                "#,
            )
            .bind(block.id)
            .bind(request.id)
            .bind(&block.duration)
            .bind(&block.frequency)
            .bind(&block.preferred_tutor_type)
            .bind(block.assigned_tutor)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;

        let mut saved = request.clone();
        saved.updated_at = updated_at;
        Ok(saved)
    }

    async fn remove(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tutor_requests WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn populate(&self, request: TutorRequest) -> StoreResult<PopulatedTutorRequest> {
        let subject_ids: Vec<Uuid> = request
            .tutors
            .iter()
            .flat_map(|block| block.subjects.iter().copied())
            .collect();
        let tutor_ids: Vec<Uuid> = request
            .tutors
            .iter()
            .filter_map(|block| block.assigned_tutor)
            .collect();

        let grades: HashMap<Uuid, GradeRef> =
            sqlx::query_as::<_, GradeRef>("SELECT id, title FROM grades WHERE id = ANY($1)")
                .bind(request.grade.clone())
                .fetch_all(&self.db_pool)
                .await?
                .into_iter()
                .map(|grade| (grade.id, grade))
                .collect();

        let subjects: HashMap<Uuid, SubjectRef> =
            sqlx::query_as::<_, SubjectRef>("SELECT id, name FROM subjects WHERE id = ANY($1)")
                .bind(subject_ids)
                .fetch_all(&self.db_pool)
                .await?
                .into_iter()
                .map(|subject| (subject.id, subject))
                .collect();

        let tutors: HashMap<Uuid, TutorRef> =
            sqlx::query_as::<_, TutorRef>("SELECT id, name, email FROM tutors WHERE id = ANY($1)")
                .bind(tutor_ids)
                .fetch_all(&self.db_pool)
                .await?
                .into_iter()
                .map(|tutor| (tutor.id, tutor))
                .collect();

        Ok(PopulatedTutorRequest {
            id: request.id,
            name: request.name,
            email: request.email,
            phone_number: request.phone_number,
            district: request.district,
            city: request.city,
            medium: request.medium,
            grade: request
                .grade
                .iter()
                .filter_map(|id| grades.get(id).cloned())
                .collect(),
            status: request.status,
            tutors: request
                .tutors
                .into_iter()
                .map(|block| PopulatedTutorBlock {
                    id: block.id,
                    subjects: block
                        .subjects
                        .iter()
                        .filter_map(|id| subjects.get(id).cloned())
                        .collect(),
                    duration: block.duration,
                    frequency: block.frequency,
                    preferred_tutor_type: block.preferred_tutor_type,
                    assigned_tutor: block.assigned_tutor.and_then(|id| tutors.get(&id).cloned()),
                })
                .collect(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        })
    }
}
