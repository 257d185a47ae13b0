//! HTTP error type and JSON error body.
//!
//! ## Error Body
//! ```text
//! {
//!   "timestamp": "2026-01-05T10:00:00Z",
//!   "status": 404,
//!   "error": "Resource not found with the specified identifier or criteria.",
//!   "message": "Product not found with ID: 42",
//!   "path": "/products/42"
//! }
//! ```
//!
//! Handlers do not know the request path, so [`ApiError::into_response`]
//! leaves it empty and stores the body as a response extension;
//! [`fill_error_path`] (a `from_fn` middleware) writes the path in.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

pub const NOT_FOUND_ERROR: &str = "Resource not found with the specified identifier or criteria.";
pub const DUPLICATE_EMAIL_ERROR: &str = "Email address already in use.";
pub const DATABASE_ERROR: &str = "Database integrity violation.";
pub const INVALID_REQUEST_ERROR: &str = "Invalid request.";
pub const INTERNAL_ERROR: &str = "Unexpected internal server error.";

const INTERNAL_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain-level error from `storefront_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from `storefront_db`.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Malformed body or query string.
    #[error("{0}")]
    BadRequest(String),

    /// Anything else; details are logged, not returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Core(CoreError::Validation(err))
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ApiError {
    /// Maps the error onto `(status, error, message)`.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Core(core) => match core {
                CoreError::ProductNotFound(_)
                | CoreError::UserNotFound(_)
                | CoreError::UsernameNotFound(_)
                | CoreError::EmailNotFound(_)
                | CoreError::CartNotFound(_) => {
                    (StatusCode::NOT_FOUND, NOT_FOUND_ERROR, core.to_string())
                }
                CoreError::DuplicateEmail(_) => (
                    StatusCode::BAD_REQUEST,
                    DUPLICATE_EMAIL_ERROR,
                    core.to_string(),
                ),
                CoreError::Validation(validation) => (
                    StatusCode::BAD_REQUEST,
                    INVALID_REQUEST_ERROR,
                    validation.to_string(),
                ),
                CoreError::PasswordHash(msg) => {
                    tracing::error!(error = %msg, "Password hashing failed");
                    internal()
                }
            },

            ApiError::Db(db) => match db {
                DbError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    NOT_FOUND_ERROR,
                    format!("{entity} not found with ID: {id}"),
                ),
                e if e.is_constraint_violation() => (
                    StatusCode::BAD_REQUEST,
                    DATABASE_ERROR,
                    format!(
                        "Database error detected: {e}. Please verify database constraints and configurations"
                    ),
                ),
                other => {
                    tracing::error!(error = %other, "Database error");
                    internal()
                }
            },

            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, INVALID_REQUEST_ERROR, msg.clone())
            }

            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_ERROR,
        INTERNAL_MESSAGE.to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.classify();
        let body = ErrorBody {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: error.to_string(),
            message,
            path: String::new(),
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Middleware: rewrites error bodies with the request path.
pub async fn fill_error_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorBody>() {
        Some(mut body) => {
            body.path = path;
            let status = response.status();
            let (mut parts, _) = response.into_parts();
            let rebuilt = (status, Json(body)).into_response();
            parts.headers = rebuilt.headers().clone();
            Response::from_parts(parts, rebuilt.into_body())
        }
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_error(err: ApiError) -> (StatusCode, &'static str, String) {
        err.classify()
    }

    #[test]
    fn test_not_found_mapping() {
        let (status, error, message) =
            status_and_error(CoreError::ProductNotFound("42".into()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error, NOT_FOUND_ERROR);
        assert_eq!(message, "Product not found with ID: 42");
    }

    #[test]
    fn test_duplicate_email_mapping() {
        let (status, error, message) =
            status_and_error(CoreError::DuplicateEmail("a@b.com".into()).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, DUPLICATE_EMAIL_ERROR);
        assert_eq!(
            message,
            "The email address 'a@b.com' is already associated with an existing account."
        );
    }

    #[test]
    fn test_constraint_violation_mapping() {
        let err = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".into(),
        };
        let (status, error, message) = status_and_error(err.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, DATABASE_ERROR);
        assert!(message.starts_with("Database error detected: "));
        assert!(message.ends_with("Please verify database constraints and configurations"));
    }

    #[test]
    fn test_internal_hides_details() {
        let (status, error, message) =
            status_and_error(ApiError::Internal("disk on fire".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error, INTERNAL_ERROR);
        assert!(!message.contains("disk"));
    }

    #[test]
    fn test_response_carries_body_extension() {
        let response = ApiError::BadRequest("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.extensions().get::<ErrorBody>().unwrap();
        assert_eq!(body.status, 400);
        assert_eq!(body.message, "bad");
    }
}
