use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::storage::StorageError;

/// Message shown both for missing reports and for operations the caller may not perform,
/// so responses never reveal which report ids exist.
pub const DENIED_MESSAGE: &str = "Not found or access denied";

#[derive(Debug)]
pub enum AppError {
    Unauthenticated(String),
    Unauthorized(String),
    NotFound(String),
    InvalidStatus(String),
    UploadFailed(String),
    BadRequest(String),
    TransientStore(sqlx::Error),
    Internal(String),
    Database(sqlx::Error),
}

impl AppError {
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::TransientStore(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::InvalidStatus(msg) => write!(f, "Invalid Status: {msg}"),
            AppError::UploadFailed(msg) => write!(f, "Upload Failed: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::TransientStore(err) => write!(f, "Transient Store Error: {err}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                tracing::debug!("Access denied: {msg}");
                (StatusCode::NOT_FOUND, DENIED_MESSAGE.to_string())
            }
            AppError::InvalidStatus(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::UploadFailed(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::TransientStore(err) => {
                tracing::warn!("Transient store error: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable, please retry".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => AppError::TransientStore(err),
            other => AppError::Database(other),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::UploadFailed(format!("File storage failed: {err}"))
    }
}
