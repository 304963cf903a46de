//! Query routes.

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use pricewatch_types::{DeleteQueryRequest, Query};
use std::sync::Arc;
use tracing::info;

/// GET /api/getQueries
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Query>>, ApiError> {
    let queries = state
        .store
        .queries()
        .await
        .map_err(ApiError::store("queries"))?;
    Ok(Json(queries))
}

/// POST /api/addQuery
pub async fn add(
    State(state): State<Arc<AppState>>,
    ValidJson(query): ValidJson<Query>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .upsert_query(query)
        .await
        .map_err(ApiError::store("upsert_query"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/addQueries - all rows or none.
pub async fn add_batch(
    State(state): State<Arc<AppState>>,
    ValidJson(queries): ValidJson<Vec<Query>>,
) -> Result<StatusCode, ApiError> {
    let count = queries.len();
    state
        .store
        .upsert_queries(queries)
        .await
        .map_err(ApiError::store("upsert_queries"))?;

    info!(target: "pricewatch::api", "Saved {} queries", count);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/deleteQuery - items under the query are kept.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<DeleteQueryRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_query(req.id)
        .await
        .map_err(ApiError::store("delete_query"))?;
    Ok(StatusCode::NO_CONTENT)
}
