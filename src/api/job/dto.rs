use serde::Serialize;

use crate::db::models::Job;

/// `{"job": {...}}`
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

/// `{"jobs": [...]}`
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

/// `{"deleted": id}`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: i32,
}
