// ABOUTME: API error type and the single translation point from failures to HTTP responses.
// ABOUTME: Validation maps to 400, missing records to 404, and everything else to 500 with its message.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roster_store::StoreError;
use thiserror::Error;

pub const EMPLOYEE_NOT_FOUND: &str = "Employee not found";
pub const EMAIL_EXISTS: &str = "Email already exists";

/// Errors returned by the employee handlers. The display text is exactly
/// what goes into the `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client input was missing, empty, malformed, or conflicts with an
    /// existing email (400).
    #[error("{0}")]
    Validation(String),

    /// No employee has the requested id (404).
    #[error("{0}")]
    NotFound(String),

    /// Anything else (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn employee_not_found() -> Self {
        ApiError::NotFound(EMPLOYEE_NOT_FOUND.to_string())
    }

    pub fn email_exists() -> Self {
        ApiError::Validation(EMAIL_EXISTS.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(msg) => tracing::error!("request failed: {}", msg),
            ApiError::Validation(msg) => tracing::warn!("rejected request: {}", msg),
            ApiError::NotFound(_) => {}
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::employee_not_found(),
            StoreError::DuplicateEmail(_) => ApiError::email_exists(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

// Ids are integers; anything else cannot name an employee.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::employee_not_found()
    }
}
