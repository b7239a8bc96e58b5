use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::error;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run `SELECT 1` and report `ok_status` or `failed_status` accordingly
async fn probe_database(
    pool: &Pool<Postgres>,
    ok_status: &'static str,
    failed_status: &'static str,
) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse {
            status: ok_status,
            database: "connected",
            error: None,
        }),
        Err(e) => {
            error!("Database probe failed ({}): {:?}", failed_status, e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: failed_status,
                database: "disconnected",
                error: Some(format!("Database unavailable: {}", e)),
            })
        }
    }
}

/// General health check including database connectivity
#[get("/health")]
async fn health_check(pool: web::Data<Pool<Postgres>>) -> impl Responder {
    probe_database(pool.get_ref(), "healthy", "unhealthy").await
}

/// Readiness probe; 503 while the database is unreachable
#[get("/ready")]
async fn readiness_check(pool: web::Data<Pool<Postgres>>) -> impl Responder {
    probe_database(pool.get_ref(), "ready", "not_ready").await
}

/// Liveness probe; never touches the database
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive",
        database: "not_checked",
        error: None,
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
