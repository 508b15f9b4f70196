//! Entry Routes
//!
//! - POST /api/v1/entries - Log one mood entry

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{CreateEntryRequest, CreateEntryResponse};
use crate::api::error::ApiResult;
use crate::api::state::{blocking, AppState};
use crate::storage::NewEntry;

/// POST /api/v1/entries
///
/// Stamps the entry with the current time. Metrics outside 0..=100 are
/// rejected before anything is written.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateEntryResponse>)> {
    let Json(req) = payload?;
    let new_entry = NewEntry::from(req);

    let store = state.entries.clone();
    let entry = blocking(move || store.create(&new_entry)).await?;

    tracing::debug!(id = entry.id, "Entry created");

    Ok((StatusCode::CREATED, Json(CreateEntryResponse::created(entry))))
}
