//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /api/v1/status - Schema health of the database

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::{blocking, AppState};
use crate::migrations::{DatabaseStatus, MigrationError};

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /api/v1/status
///
/// `ok` is true only when the schema is at the latest version with every
/// table present. An uninitialised database is a normal `ok: false`
/// answer, not an error.
pub async fn database_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<DatabaseStatus>> {
    let migrations = state.migrations.clone();
    let status = blocking(move || Ok::<_, MigrationError>(migrations.status())).await?;

    if !status.ok {
        tracing::debug!(
            code = ?status.code,
            uptime_seconds = state.uptime_seconds(),
            "Database not ready"
        );
    }

    Ok(Json(status))
}
