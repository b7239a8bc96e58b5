use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::error::DatabaseError;
use sqlx::postgres::PgDatabaseError;
use std::fmt;
use tracing::{error, warn};

// Postgres SQLSTATE codes translated into client errors
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Message carried in an error body: a single line or a list of lines
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for ErrorMessage {
    fn from(msg: &str) -> Self {
        ErrorMessage::One(msg.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(msg: String) -> Self {
        ErrorMessage::One(msg)
    }
}

impl From<Vec<String>> for ErrorMessage {
    fn from(msgs: Vec<String>) -> Self {
        ErrorMessage::Many(msgs)
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::One(msg) => write!(f, "{}", msg),
            ErrorMessage::Many(msgs) => write!(f, "{}", msgs.join("; ")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: ErrorMessage,
    pub status: u16,
}

/// Error envelope shared by every failing route:
/// `{"error": {"message": ..., "status": ...}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<ErrorMessage>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                status: status.as_u16(),
            },
        }
    }

    pub fn into_http(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self)
    }
}

/// Errors raised by the store, the builders and the route layer
#[derive(Debug)]
pub enum ServiceError {
    /// Database operation failed for a reason the client cannot fix
    DatabaseError(sqlx::Error),

    /// Empty update, invalid body or query, or a rejected value
    BadRequest(ErrorMessage),

    /// No record with the requested id
    NotFound(String),

    /// Missing, invalid or non-admin credentials
    Unauthorized(String),

    /// Unique constraint violated
    Duplicate(String),

    /// Foreign key points at a record that does not exist
    MissingReference(String),

    /// The server is misconfigured; the detail is logged, never returned
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<ErrorMessage>) -> Self {
        ServiceError::BadRequest(message.into())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::DatabaseError(e) => write!(f, "Database error: {}", e),
            ServiceError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            ServiceError::MissingReference(msg) => write!(f, "Missing reference: {}", msg),
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::DatabaseError(e) => Some(e),
            _ => None,
        }
    }
}

/// Prefer the Postgres DETAIL line (it names the offending key) over the bare message
fn describe(db_err: &(dyn DatabaseError + 'static)) -> String {
    db_err
        .try_downcast_ref::<PgDatabaseError>()
        .and_then(|pg| pg.detail())
        .map(str::to_string)
        .unwrap_or_else(|| db_err.message().to_string())
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        let translated = match &err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => Some(ServiceError::Duplicate(describe(&**db_err))),
                Some(FOREIGN_KEY_VIOLATION) => {
                    Some(ServiceError::MissingReference(describe(&**db_err)))
                }
                Some(CHECK_VIOLATION) | Some(NOT_NULL_VIOLATION)
                | Some(NUMERIC_VALUE_OUT_OF_RANGE) => {
                    Some(ServiceError::bad_request(describe(&**db_err)))
                }
                _ => None,
            },
            _ => None,
        };

        translated.unwrap_or(ServiceError::DatabaseError(err))
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DatabaseError(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::BadRequest(_)
            | ServiceError::Duplicate(_)
            | ServiceError::MissingReference(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            ServiceError::DatabaseError(e) => {
                // Full error stays in the logs only
                error!("Database error: {:?}", e);
                ErrorMessage::from("Database error occurred")
            }
            ServiceError::Internal(msg) => {
                error!("Internal error: {}", msg);
                ErrorMessage::from("Internal server error")
            }
            ServiceError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                msg.clone()
            }
            ServiceError::NotFound(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Duplicate(msg)
            | ServiceError::MissingReference(msg) => {
                warn!("{}", self);
                ErrorMessage::from(msg.as_str())
            }
        };

        ErrorResponse::new(status, message).into_http()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::bad_request("No data").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("No job found with id: 0".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Unauthorized("Admin required".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Duplicate("Key (handle)=(c1) already exists.".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::MissingReference("no company".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::DatabaseError(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_non_constraint_errors_stay_database_errors() {
        let err = ServiceError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ServiceError::DatabaseError(sqlx::Error::RowNotFound)));
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = ServiceError::NotFound("No job found with id: 7".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": {"message": "No job found with id: 7", "status": 404}})
        );
    }

    #[actix_web::test]
    async fn test_message_list_serializes_as_array() {
        let err = ServiceError::bad_request(vec![
            "title: must not be empty".to_string(),
            "salary: must be at least 0".to_string(),
        ]);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"]["status"], 400);
        assert_eq!(json["error"]["message"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_database_error_hides_details() {
        let err = ServiceError::DatabaseError(sqlx::Error::PoolTimedOut);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"]["message"], "Database error occurred");
        assert_eq!(json["error"]["status"], 500);
    }

    #[actix_web::test]
    async fn test_internal_error_hides_details() {
        let err = ServiceError::Internal("JwtAuth is not registered".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"]["message"], "Internal server error");
        assert_eq!(json["error"]["status"], 500);
    }
}
