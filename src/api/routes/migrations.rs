//! Migration Routes
//!
//! Operator commands that move the schema version.
//!
//! - POST /api/v1/migrations/init - Bookkeeping table plus the first step
//! - POST /api/v1/migrations/migrate - Every pending step
//! - POST /api/v1/migrations/rollback - Undo the current step
//! - POST /api/v1/migrations/reset - Undo every step

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::OpResponse;
use crate::api::error::ApiResult;
use crate::api::state::{blocking, AppState};
use crate::migrations::{MigrationManager, MigrationOutcome, MigrationResult};

async fn run_command(
    state: &AppState,
    command: &'static str,
    f: fn(&MigrationManager) -> MigrationResult<MigrationOutcome>,
) -> ApiResult<Json<OpResponse>> {
    let migrations = state.migrations.clone();
    let outcome = blocking(move || f(&migrations)).await?;

    tracing::info!(
        command,
        from = outcome.from_version,
        to = outcome.to_version,
        "Migration command finished"
    );

    Ok(Json(outcome.into()))
}

/// POST /api/v1/migrations/init
pub async fn init(State(state): State<Arc<AppState>>) -> ApiResult<Json<OpResponse>> {
    run_command(&state, "init", MigrationManager::init).await
}

/// POST /api/v1/migrations/migrate
pub async fn migrate(State(state): State<Arc<AppState>>) -> ApiResult<Json<OpResponse>> {
    run_command(&state, "migrate", MigrationManager::migrate).await
}

/// POST /api/v1/migrations/rollback
///
/// Drops the tables of the current step even when they hold data.
pub async fn rollback(State(state): State<Arc<AppState>>) -> ApiResult<Json<OpResponse>> {
    run_command(&state, "rollback", MigrationManager::rollback).await
}

/// POST /api/v1/migrations/reset
pub async fn reset(State(state): State<Arc<AppState>>) -> ApiResult<Json<OpResponse>> {
    run_command(&state, "reset", MigrationManager::reset).await
}
