use sqlx::{Pool, Postgres};
use tracing::info;

use super::dto::{DeletedResponse, JobListResponse, JobResponse};
use super::models::{JobFilter, JobUpdate, NewJob};
use crate::api::error::ServiceError;
use crate::db::job_repository::JobRepository;

/// Job service containing business logic
pub struct JobService {
    pool: Pool<Postgres>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List jobs, narrowed by `filter` when it names any search key
    ///
    /// A filter holding only `type` (or nothing) lists every job.
    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<JobListResponse, ServiceError> {
        let jobs = if filter.is_empty() {
            JobRepository::find_all(&self.pool).await?
        } else {
            info!("Service: Filtering jobs with {:?}", filter);
            JobRepository::filter(&self.pool, filter).await?
        };

        info!("Service: Returning {} jobs", jobs.len());
        Ok(JobListResponse { jobs })
    }

    pub async fn get_job(&self, id: i32) -> Result<JobResponse, ServiceError> {
        let job = JobRepository::get(&self.pool, id).await?;
        Ok(JobResponse { job })
    }

    /// Create a single job
    ///
    /// # Returns
    /// - `Ok(JobResponse)` - Job created successfully
    /// - `Err(ServiceError)` - Creation failed; unknown company or
    ///   constraint violations surface as 400s
    pub async fn create_job(&self, job: &NewJob) -> Result<JobResponse, ServiceError> {
        info!(
            "Service: Creating job with title={} for company={}",
            job.title, job.company_handle
        );

        let job = JobRepository::create(&self.pool, job).await?;

        info!("Service: Job created successfully with id={}", job.id);
        Ok(JobResponse { job })
    }

    pub async fn update_job(
        &self,
        id: i32,
        update: JobUpdate,
    ) -> Result<JobResponse, ServiceError> {
        info!("Service: Updating job id={}", id);

        let job = JobRepository::update(&self.pool, id, update).await?;

        info!("Service: Job {} updated", id);
        Ok(JobResponse { job })
    }

    pub async fn delete_job(&self, id: i32) -> Result<DeletedResponse, ServiceError> {
        info!("Service: Deleting job id={}", id);

        JobRepository::remove(&self.pool, id).await?;

        info!("Service: Job {} deleted", id);
        Ok(DeletedResponse { deleted: id })
    }
}
