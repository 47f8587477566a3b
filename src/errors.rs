use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failure modes of session token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token is malformed")]
    Malformed,

    #[error("session token has expired")]
    Expired,
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Prefixes storage failures with the operation and entity they came from.
    /// Client-facing variants pass through untouched.
    pub fn context(self, operation: &str, entity_id: &str) -> Self {
        match self {
            AppError::DatabaseError(msg) => {
                AppError::DatabaseError(format!("{} [{}]: {}", operation, entity_id, msg))
            }
            AppError::InternalError(msg) => {
                AppError::InternalError(format!("{} [{}]: {}", operation, entity_id, msg))
            }
            other => other,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
        })
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}
impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}
impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::InternalError(format!("BSON deserialization error: {}", err))
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Unauthorized("test".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("test".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Timeout("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        for err in [AuthError::InvalidSignature, AuthError::Malformed, AuthError::Expired] {
            let app_err: AppError = err.into();
            assert_eq!(app_err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_context_only_wraps_storage_failures() {
        let err = AppError::DatabaseError("connection reset".into())
            .context("collections.find_by_id", "abc");
        assert_eq!(
            err.to_string(),
            "Database error: collections.find_by_id [abc]: connection reset"
        );

        let err = AppError::NotFound("collection".into()).context("op", "abc");
        assert_eq!(err.to_string(), "Not found: collection");
    }

    #[test]
    fn test_timeout_has_distinct_code() {
        assert_eq!(AppError::Timeout("x".into()).error_code(), "TIMEOUT");
        assert_eq!(AppError::DatabaseError("x".into()).error_code(), "DATABASE_ERROR");
    }
}
