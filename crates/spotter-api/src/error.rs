//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across the
//! session endpoints, mapping session errors to HTTP status codes. The
//! `/get_definitions` endpoint keeps its own `{ "error" }` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use spotter_session::SessionError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "conflict").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 409 Conflict - operation not valid in the current session state.
    Conflict(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 503 Service Unavailable - capture engine not available.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let message = err.user_message();
        match err {
            SessionError::Keywords(_) => ApiError::BadRequest(message),
            SessionError::NoKeywordsLoaded | SessionError::InvalidTransition { .. } => {
                ApiError::Conflict(message)
            }
            SessionError::CaptureUnsupported
            | SessionError::CaptureEngine(_)
            | SessionError::StartFailed(_) => {
                ApiError::ServiceUnavailable(message)
            }
        }
    }
}
