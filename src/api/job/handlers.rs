use actix_web::{
    delete, get, patch, post,
    web::{Data, Path, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::{Json, Query};
use tracing::info;

use super::models::{JobFilter, JobUpdate, NewJob};
use super::service::JobService;
use crate::api::auth::AdminUser;
use crate::api::error::ServiceError;

#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    filter: Query<JobFilter>,
) -> Result<HttpResponse, ServiceError> {
    let response = service.list_jobs(&filter).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/{id}")]
async fn get_job(
    service: Data<JobService>,
    path: Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let response = service.get_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

// AdminUser goes first so unauthorized callers get 401 before the body is read
#[post("")]
async fn create_job(
    admin: AdminUser,
    service: Data<JobService>,
    job: Json<NewJob>,
) -> Result<HttpResponse, ServiceError> {
    info!("Admin {} creating job", admin.username());
    let response = service.create_job(&job).await?;
    Ok(HttpResponse::Created().json(response))
}

#[patch("/{id}")]
async fn update_job(
    admin: AdminUser,
    service: Data<JobService>,
    path: Path<i32>,
    update: Json<JobUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    info!("Admin {} updating job {}", admin.username(), id);
    let response = service.update_job(id, update.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{id}")]
async fn delete_job(
    admin: AdminUser,
    service: Data<JobService>,
    path: Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    info!("Admin {} deleting job {}", admin.username(), id);
    let response = service.delete_job(id).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .service(list_jobs)
            .service(get_job)
            .service(create_job)
            .service(update_job)
            .service(delete_job),
    );
}
