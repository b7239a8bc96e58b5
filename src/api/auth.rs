//! Bearer-token authorization for admin-only routes.
//!
//! Tokens are HS256 JWTs carrying `username` and `isAdmin`. Handlers that
//! mutate data take an [`AdminUser`] argument; extraction fails with 401
//! before the handler body runs.
//!
//! `JwtAuth` must be registered as app data:
//!
//! ```rust,ignore
//! App::new().app_data(web::Data::new(JwtAuth::new(secret, ttl)))
//! ```

use actix_web::{dev::Payload, http::header, web::Data, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::error::ServiceError;

/// Claims carried by every token this service issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub username: String,

    #[serde(default)]
    pub is_admin: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and validates tokens signed with a shared secret
pub struct JwtAuth {
    secret: String,
    validation: Validation,
    token_ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>, token_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // clock skew

        Self {
            secret: secret.into(),
            validation,
            token_ttl_secs,
        }
    }

    pub fn create_token(
        &self,
        username: &str,
        is_admin: bool,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            username: username.to_string(),
            is_admin,
            iat: now,
            exp: now + self.token_ttl_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ServiceError::Unauthorized("Token has expired".into()),
            _ => ServiceError::Unauthorized(format!("Invalid token: {}", e)),
        })
    }

    /// Strip the `Bearer ` prefix from an Authorization header value
    pub fn extract_token(auth_header: &str) -> Result<&str, ServiceError> {
        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::Unauthorized("Invalid token format (expected 'Bearer <token>')".into())
        })?;

        if token.is_empty() {
            return Err(ServiceError::Unauthorized("Missing token".into()));
        }

        Ok(token)
    }
}

/// A caller whose token validated and carries `isAdmin: true`
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl AdminUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

fn admin_from_request(req: &HttpRequest) -> Result<AdminUser, ServiceError> {
    let auth = req
        .app_data::<Data<JwtAuth>>()
        .ok_or_else(|| ServiceError::Internal("JwtAuth is not registered as app data".into()))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".into()))?
        .to_str()
        .map_err(|_| ServiceError::Unauthorized("Malformed authorization header".into()))?;

    let claims = auth.validate_token(JwtAuth::extract_token(header_value)?)?;

    if !claims.is_admin {
        warn!("Non-admin user {} denied on {}", claims.username, req.path());
        return Err(ServiceError::Unauthorized("Admin privileges required".into()));
    }

    Ok(AdminUser(claims))
}

impl FromRequest for AdminUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(admin_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    const SECRET: &str = "test-secret-key";

    #[test]
    fn test_validate_valid_token() {
        let auth = JwtAuth::new(SECRET, 3600);

        let token = auth.create_token("admin", true).unwrap();
        let claims = auth.validate_token(&token).unwrap();

        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin);
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired well past the leeway
        let auth = JwtAuth::new(SECRET, -600);

        let token = auth.create_token("admin", true).unwrap();
        let result = auth.validate_token(&token);

        match result {
            Err(ServiceError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_wrong_secret() {
        let token = JwtAuth::new("other-secret", 3600)
            .create_token("admin", true)
            .unwrap();

        let result = JwtAuth::new(SECRET, 3600).validate_token(&token);

        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(JwtAuth::extract_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(JwtAuth::extract_token("Basic abc").is_err());
        assert!(JwtAuth::extract_token("Bearer ").is_err());
    }

    #[actix_web::test]
    async fn test_extractor_accepts_admin() {
        let auth = JwtAuth::new(SECRET, 3600);
        let token = auth.create_token("admin", true).unwrap();

        let req = TestRequest::default()
            .app_data(Data::new(auth))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let admin = AdminUser::extract(&req).await.unwrap();
        assert_eq!(admin.username(), "admin");
    }

    #[actix_web::test]
    async fn test_extractor_rejects_non_admin() {
        let auth = JwtAuth::new(SECRET, 3600);
        let token = auth.create_token("u1", false).unwrap();

        let req = TestRequest::default()
            .app_data(Data::new(auth))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let result = AdminUser::extract(&req).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_extractor_rejects_missing_header() {
        let req = TestRequest::default()
            .app_data(Data::new(JwtAuth::new(SECRET, 3600)))
            .to_http_request();

        let result = AdminUser::extract(&req).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_extractor_without_jwt_auth_is_server_error() {
        let token = JwtAuth::new(SECRET, 3600).create_token("admin", true).unwrap();

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let err = AdminUser::extract(&req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(
            actix_web::ResponseError::status_code(&err),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
