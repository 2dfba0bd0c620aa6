/// Error handling for the API server
///
/// Handlers return [`ApiResult`], and [`ApiError`] renders as a JSON body:
///
/// ```json
/// { "error": "unauthorized", "message": "access denied" }
/// ```
///
/// Core errors convert through `From<chainstack_shared::Error>`. Storage and
/// internal failures are logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Validation errors (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// The uniform answer to any failed authorization or foreign resource
    pub fn access_denied() -> Self {
        ApiError::Forbidden("access denied".to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => {
                let message = match errors.as_slice() {
                    [only] => format!("invalid {}: {}", only.field, only.message),
                    _ => "Request validation failed".to_string(),
                };
                (StatusCode::BAD_REQUEST, "validation_error", message, Some(errors))
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert core errors to API errors
impl From<chainstack_shared::Error> for ApiError {
    fn from(err: chainstack_shared::Error) -> Self {
        use chainstack_shared::Error;

        match err {
            Error::NotAuthenticated => ApiError::Unauthorized("invalid credentials".to_string()),
            Error::Denied => ApiError::Unauthorized("access denied".to_string()),
            Error::QuotaExceeded { .. } => {
                ApiError::Forbidden("resource quota exceeded".to_string())
            }
            Error::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            Error::Validation { field, reason } => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field,
                    message: reason,
                }])
            }
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Storage(e) => ApiError::InternalError(format!("Database error: {}", e)),
            Error::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}
