//! HTTP route handlers.

pub mod items;
pub mod queries;

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pricewatch_types::{endpoints, ErrorResponse};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Queries
        .route(endpoints::GET_QUERIES, get(queries::list))
        .route(endpoints::ADD_QUERY, post(queries::add))
        .route(endpoints::ADD_QUERIES, post(queries::add_batch))
        .route(endpoints::DELETE_QUERY, post(queries::delete))
        // Items
        .route(endpoints::GET_ITEMS, get(items::list))
        .route(endpoints::GET_ITEMS_QUERIES, post(items::for_queries))
        .route(endpoints::ADD_ITEM, post(items::add))
        .route(endpoints::ADD_ITEMS, post(items::add_batch))
        .route(endpoints::DELETE_ITEM, post(items::delete))
        .route(endpoints::RENAME_ITEM, post(items::rename))
        .route(endpoints::HEALTH, get(health))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub operation_timeout_ms: u64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        operation_timeout_ms: state.config.operation_timeout_ms,
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Turn a handler panic into an opaque 500.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    error!(target: "pricewatch::api", "Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
        }),
    )
        .into_response()
}
