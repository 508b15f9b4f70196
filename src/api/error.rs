//! API Error Types
//!
//! Every failure that reaches a handler is converted here into the
//! `{ok: false, message}` envelope with a matching HTTP status. Nothing
//! below the API boundary is returned to the client unconverted.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::dto::OpResponse;
use crate::migrations::MigrationError;
use crate::query::QueryError;
use crate::storage::StorageError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body or query string was malformed or incomplete
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage layer error
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Migration command failed or was not allowed in the current state
    #[error("{0}")]
    Migration(#[from] MigrationError),

    /// Graph query failed
    #[error("{0}")]
    Query(#[from] QueryError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Storage(e) => storage_status(e),
            ApiError::Migration(MigrationError::State(_)) => {
                (StatusCode::CONFLICT, "MIGRATION_STATE_ERROR")
            }
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MIGRATION_ERROR"),
            ApiError::Query(QueryError::Parse(_)) => (StatusCode::BAD_REQUEST, "PARSE_ERROR"),
            ApiError::Query(QueryError::Storage(e)) => storage_status(e),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

fn storage_status(error: &StorageError) -> (StatusCode, &'static str) {
    match error {
        StorageError::InvalidEntry(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
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

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        (status, Json(OpResponse::failure(self.to_string()))).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
