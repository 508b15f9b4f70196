//! Graph Routes
//!
//! - GET /api/v1/graph?from=&to= - Entries for one chart window

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{GraphDataParams, GraphDataResponse};
use crate::api::error::ApiResult;
use crate::api::state::{blocking, AppState};

/// GET /api/v1/graph
///
/// `from` and `to` are optional ISO-8601 timestamps. `firstEntry` and
/// `lastEntry` always describe the whole dataset.
pub async fn graph_data(
    State(state): State<Arc<AppState>>,
    params: Result<Query<GraphDataParams>, QueryRejection>,
) -> ApiResult<Json<GraphDataResponse>> {
    let Query(params) = params?;

    let queries = state.queries.clone();
    let data = blocking(move || {
        queries.graph_data(params.from.as_deref(), params.to.as_deref())
    })
    .await?;

    Ok(Json(data.into()))
}
