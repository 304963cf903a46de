//! Item routes.

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use pricewatch_types::{
    AddItemResponse, AddItemsResponse, DeleteItemRequest, Item, NewItem, QueryKeys,
    RenameItemRequest,
};
use std::sync::Arc;
use tracing::{debug, info};

/// GET /api/getItems
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state
        .store
        .items()
        .await
        .map_err(ApiError::store("items"))?;
    Ok(Json(items))
}

/// POST /api/getItemsQueries
///
/// An empty key list answers `[]` without touching the store.
pub async fn for_queries(
    State(state): State<Arc<AppState>>,
    ValidJson(keys): ValidJson<QueryKeys>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let mut keys = keys.distinct();

    let items = match keys.len() {
        0 => Vec::new(),
        1 => {
            let key = keys.remove(0);
            state
                .store
                .items_for_query(key)
                .await
                .map_err(ApiError::store("items_for_query"))?
        }
        _ => state
            .store
            .items_for_queries(keys)
            .await
            .map_err(ApiError::store("items_for_queries"))?,
    };

    Ok(Json(items))
}

/// POST /api/addItem
pub async fn add(
    State(state): State<Arc<AppState>>,
    ValidJson(item): ValidJson<NewItem>,
) -> Result<Json<AddItemResponse>, ApiError> {
    let id = state
        .store
        .add_item(item)
        .await
        .map_err(ApiError::store("add_item"))?;

    debug!(target: "pricewatch::api", "Added item {}", id);
    Ok(Json(AddItemResponse { id }))
}

/// POST /api/addItems - all items or none.
pub async fn add_batch(
    State(state): State<Arc<AppState>>,
    ValidJson(items): ValidJson<Vec<NewItem>>,
) -> Result<Json<AddItemsResponse>, ApiError> {
    let ids = state
        .store
        .add_items(items)
        .await
        .map_err(ApiError::store("add_items"))?;

    info!(target: "pricewatch::api", "Added {} items", ids.len());
    Ok(Json(AddItemsResponse { ids }))
}

/// POST /api/renameItem
pub async fn rename(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RenameItemRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .rename_item(req.id, req.name)
        .await
        .map_err(ApiError::store("rename_item"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/deleteItem
pub async fn delete(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<DeleteItemRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_item(req.id)
        .await
        .map_err(ApiError::store("delete_item"))?;
    Ok(StatusCode::NO_CONTENT)
}
