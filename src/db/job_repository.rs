use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::api::error::ServiceError;
use crate::api::job::{JobFilter, JobUpdate, NewJob};
use crate::db::job_filter::build_filter_query;
use crate::db::models::{Job, JOB_COLUMNS};
use crate::db::sql::{sql_for_partial_update, ColumnMap};

/// Request field names whose `jobs` column is spelled differently
pub const JOB_FIELD_COLUMNS: &ColumnMap = &[("companyHandle", "company_handle")];

fn not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("No job found with id: {}", id))
}

/// Repository for Job database operations
pub struct JobRepository;

impl JobRepository {
    /// Insert a job and return the stored record with its new id
    pub async fn create(pool: &Pool<Postgres>, job: &NewJob) -> Result<Job, ServiceError> {
        debug!(
            "Creating job: title={}, company_handle={}",
            job.title, job.company_handle
        );

        let row = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (title, salary, equity, company_handle)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(&job.title)
        .bind(job.salary)
        .bind(job.equity)
        .bind(&job.company_handle)
        .fetch_one(pool)
        .await?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    /// Every job, ordered by id
    pub async fn find_all(pool: &Pool<Postgres>) -> Result<Vec<Job>, ServiceError> {
        let rows = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs ORDER BY id",
            JOB_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        debug!("Fetched {} jobs", rows.len());
        Ok(rows)
    }

    pub async fn get(pool: &Pool<Postgres>, id: i32) -> Result<Job, ServiceError> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Apply a partial update and return the updated record
    ///
    /// # Returns
    /// - `Err(ServiceError::BadRequest)` - `update` carries no fields
    /// - `Err(ServiceError::NotFound)` - no job has this id
    pub async fn update(
        pool: &Pool<Postgres>,
        id: i32,
        update: JobUpdate,
    ) -> Result<Job, ServiceError> {
        let partial = sql_for_partial_update(update.into_fields(), JOB_FIELD_COLUMNS)?;
        let id_idx = partial.values.len() + 1;

        let query = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            partial.set_cols, id_idx, JOB_COLUMNS
        );
        debug!("Updating job {}: {}", id, partial.set_cols);

        let mut query_builder = sqlx::query_as::<_, Job>(&query);
        for value in partial.values {
            query_builder = value.bind_to(query_builder);
        }

        query_builder
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn remove(pool: &Pool<Postgres>, id: i32) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        debug!("Job {} deleted", id);
        Ok(())
    }

    /// Jobs matching every key present in `filter`
    pub async fn filter(
        pool: &Pool<Postgres>,
        filter: &JobFilter,
    ) -> Result<Vec<Job>, ServiceError> {
        let mut query_builder = build_filter_query(filter);
        debug!("Filtering jobs: {}", query_builder.sql());

        let rows = query_builder
            .build_query_as::<Job>()
            .fetch_all(pool)
            .await?;

        debug!("Filter matched {} jobs", rows.len());
        Ok(rows)
    }
}
