//! Error handling for the Fingerling Distribution Tracking System
//!
//! Every error leaves the server as the JSON envelope
//! `{ success: false, error, code, field?, details? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Upstream service returned {status}")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.to_string(),
            field: None,
            details: None,
        }
    }
}

impl From<shared::ValidationError> for AppError {
    fn from(err: shared::ValidationError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    /// Status code and body for this error
    pub fn to_parts(&self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("INVALID_CREDENTIALS", "Invalid email or password"),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("UNAUTHORIZED", msg.clone()),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("FORBIDDEN", msg.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    field: Some(field.clone()),
                    ..ErrorResponse::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", msg.clone()),
            ),
            AppError::DuplicateEntry(what) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("DUPLICATE_ENTRY", format!("{} already exists", what)),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Upstream { status, body } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorResponse {
                    details: Some(body.clone()),
                    ..ErrorResponse::new("UPSTREAM_ERROR", "Prediction service returned an error")
                },
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("EXTERNAL_SERVICE_ERROR", format!("External service error: {}", msg)),
            ),
            AppError::StorageError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("STORAGE_ERROR", "Failed to store the uploaded file"),
            ),
            AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_unique_violation() => (
                StatusCode::CONFLICT,
                ErrorResponse::new("DUPLICATE_ENTRY", "A record with this identifier already exists"),
            ),
            AppError::DatabaseError(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("INVALID_REFERENCE", "A referenced record does not exist"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();

        // Full detail stays in the server log
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: AppError = shared::ValidationError::new("fingerlings", "Fingerlings must be a positive number").into();
        let (status, body) = err.to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.field.as_deref(), Some("fingerlings"));
        assert_eq!(body.error, "Fingerlings must be a positive number");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, body) = AppError::not_found("Batch").to_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Batch not found");
    }

    #[test]
    fn test_upstream_status_is_relayed() {
        let err = AppError::Upstream {
            status: 422,
            body: serde_json::json!({ "detail": "bad range" }),
        };
        let (status, body) = err.to_parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.details.unwrap()["detail"], "bad range");
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let (status, body) = AppError::Internal("connection string leaked".to_string()).to_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("leaked"));

        let (status, _) = AppError::DatabaseError(sqlx::Error::RowNotFound).to_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
