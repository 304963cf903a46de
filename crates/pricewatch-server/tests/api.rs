//! Integration tests for the catalog HTTP API.
//!
//! These drive the full router (extractors, validation, store writer,
//! error mapping) against a temporary on-disk database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pricewatch_server::{config::Config, routes, state::AppState};
use pricewatch_types::{endpoints, AddItemResponse, AddItemsResponse, ErrorResponse, Item, Query};
use pricewatch_core::CatalogStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_config(temp_dir: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        db_path: temp_dir.path().join("test.db"),
        operation_timeout_ms: 5000,
        write_queue_size: 16,
    }
}

/// Create the real router over a fresh database.
fn create_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let state =
        Arc::new(AppState::new(test_config(&temp_dir)).expect("Failed to create AppState"));
    (routes::router(state), temp_dir)
}

/// Send a request and return the status and raw body bytes.
async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    send_raw(app, "POST", uri, Some(body.to_string())).await
}

async fn get_json<T: serde::de::DeserializeOwned>(app: &Router, uri: &str) -> T {
    let (status, bytes) = send_raw(app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK, "GET {} failed", uri);
    serde_json::from_slice(&bytes).unwrap()
}

fn error_of(bytes: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(bytes).unwrap().error
}

fn new_item(name: &str, query: &str, price: f64) -> Value {
    json!({
        "name": name,
        "url": format!("https://shop.example/{}", name),
        "image": format!("https://img.example/{}.jpg", name),
        "price": price,
        "query": query,
    })
}

async fn add_item(app: &Router, name: &str, query: &str) -> i64 {
    let (status, bytes) = post(app, endpoints::ADD_ITEM, new_item(name, query, 10.0)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice::<AddItemResponse>(&bytes).unwrap().id
}

// ============================================================================
// QUERIES
// ============================================================================

#[tokio::test]
async fn test_query_add_list_delete_round_trip() {
    let (app, _temp) = create_test_app();

    let body = json!({"query": "laptop", "items": 0});
    let (status, _) = post(&app, endpoints::ADD_QUERY, body).await;
    assert!(status == StatusCode::OK || status == StatusCode::NO_CONTENT);

    let (status, bytes) = send_raw(&app, "GET", endpoints::GET_QUERIES, None).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!([{"query": "laptop", "items": 0}]));

    let (status, _) = post(&app, endpoints::DELETE_QUERY, json!({"id": "laptop"})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, bytes) = send_raw(&app, "GET", endpoints::GET_QUERIES, None).await;
    assert_eq!(bytes, b"[]");
}

#[tokio::test]
async fn test_empty_reads_serialize_as_empty_arrays() {
    let (app, _temp) = create_test_app();

    let (_, queries) = send_raw(&app, "GET", endpoints::GET_QUERIES, None).await;
    let (_, items) = send_raw(&app, "GET", endpoints::GET_ITEMS, None).await;
    assert_eq!(queries, b"[]");
    assert_eq!(items, b"[]");
}

#[tokio::test]
async fn test_add_query_overwrites_items_count() {
    let (app, _temp) = create_test_app();

    post(&app, endpoints::ADD_QUERY, json!({"query": "laptop", "items": 1})).await;
    post(&app, endpoints::ADD_QUERY, json!({"query": "laptop", "items": 7})).await;

    let queries: Vec<Query> = get_json(&app, endpoints::GET_QUERIES).await;
    assert_eq!(queries, vec![Query::new("laptop", 7)]);
}

#[tokio::test]
async fn test_add_queries_batch_last_wins() {
    let (app, _temp) = create_test_app();

    let (status, _) = post(
        &app,
        endpoints::ADD_QUERIES,
        json!([
            {"query": "phone", "items": 1},
            {"query": "tablet", "items": 2},
            {"query": "phone", "items": 3}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let queries: Vec<Query> = get_json(&app, endpoints::GET_QUERIES).await;
    assert_eq!(queries, vec![Query::new("phone", 3), Query::new("tablet", 2)]);
}

#[tokio::test]
async fn test_add_queries_with_invalid_row_writes_nothing() {
    let (app, _temp) = create_test_app();

    let (status, bytes) = post(
        &app,
        endpoints::ADD_QUERIES,
        json!([{"query": "phone", "items": 1}, {"query": "", "items": 2}]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&bytes), "element 1: query must not be empty");

    let queries: Vec<Query> = get_json(&app, endpoints::GET_QUERIES).await;
    assert!(queries.is_empty());
}

#[tokio::test]
async fn test_delete_missing_query_is_success() {
    let (app, _temp) = create_test_app();

    let (status, _) = post(&app, endpoints::DELETE_QUERY, json!({"id": "never-added"})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_delete_query_leaves_items_in_place() {
    let (app, _temp) = create_test_app();

    post(&app, endpoints::ADD_QUERY, json!({"query": "laptop", "items": 1})).await;
    let id = add_item(&app, "x1", "laptop").await;
    post(&app, endpoints::DELETE_QUERY, json!({"id": "laptop"})).await;

    let items: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].query, "laptop");
}

// ============================================================================
// ITEMS
// ============================================================================

#[tokio::test]
async fn test_add_item_assigns_increasing_ids_and_keeps_fields() {
    let (app, _temp) = create_test_app();

    let first = add_item(&app, "x1", "laptop").await;
    let second = add_item(&app, "xps", "laptop").await;
    assert!(second > first);

    let items: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, first);
    assert_eq!(items[0].name, "x1");
    assert_eq!(items[0].url, "https://shop.example/x1");
    assert_eq!(items[0].image, "https://img.example/x1.jpg");
    assert_eq!(items[0].price, 10.0);
    assert_eq!(items[0].query, "laptop");
}

#[tokio::test]
async fn test_add_items_batch() {
    let (app, _temp) = create_test_app();

    let (status, bytes) = post(
        &app,
        endpoints::ADD_ITEMS,
        json!([new_item("a1", "a", 1.0), new_item("b1", "b", 2.5)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids = serde_json::from_slice::<AddItemsResponse>(&bytes).unwrap().ids;
    assert_eq!(ids.len(), 2);

    let items: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;
    let stored: Vec<i64> = items.iter().map(|i| i.id).collect();
    assert_eq!(stored, ids);
}

#[tokio::test]
async fn test_get_items_queries_union() {
    let (app, _temp) = create_test_app();

    let a1 = add_item(&app, "a1", "a").await;
    let b1 = add_item(&app, "b1", "b").await;
    add_item(&app, "c1", "c").await;
    let a2 = add_item(&app, "a2", "a").await;

    let (status, bytes) = post(&app, endpoints::GET_ITEMS_QUERIES, json!(["a", "b", "a"])).await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<Item> = serde_json::from_slice(&bytes).unwrap();
    let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![a1, b1, a2]);
}

#[tokio::test]
async fn test_get_items_queries_single_key() {
    let (app, _temp) = create_test_app();

    add_item(&app, "a1", "a").await;
    let b1 = add_item(&app, "b1", "b").await;

    let (_, bytes) = post(&app, endpoints::GET_ITEMS_QUERIES, json!(["b"])).await;
    let items: Vec<Item> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, b1);
}

#[tokio::test]
async fn test_get_items_queries_empty_input() {
    let (app, _temp) = create_test_app();
    add_item(&app, "a1", "a").await;

    let (status, bytes) = post(&app, endpoints::GET_ITEMS_QUERIES, json!([])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"[]");
}

#[tokio::test]
async fn test_rename_item_changes_only_name() {
    let (app, _temp) = create_test_app();
    let id = add_item(&app, "x1", "laptop").await;
    let before: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;

    let body = json!({"id": id, "name": "X1 Carbon"});
    let (status, _) = post(&app, endpoints::RENAME_ITEM, body).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let after: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;
    let mut expected = before[0].clone();
    expected.name = "X1 Carbon".to_string();
    assert_eq!(after, vec![expected]);
}

#[tokio::test]
async fn test_rename_and_delete_missing_item_are_success() {
    let (app, _temp) = create_test_app();
    let id = add_item(&app, "x1", "laptop").await;
    let before: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;

    let body = json!({"id": id + 50, "name": "ghost"});
    let (status, _) = post(&app, endpoints::RENAME_ITEM, body).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = post(&app, endpoints::DELETE_ITEM, json!({"id": id + 50})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let after: Vec<Item> = get_json(&app, endpoints::GET_ITEMS).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_delete_item() {
    let (app, _temp) = create_test_app();
    let id = add_item(&app, "x1", "laptop").await;

    let (status, _) = post(&app, endpoints::DELETE_ITEM, json!({"id": id})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, bytes) = send_raw(&app, "GET", endpoints::GET_ITEMS, None).await;
    assert_eq!(bytes, b"[]");
}

// ============================================================================
// ROUTING AND REJECTIONS
// ============================================================================

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let (app, _temp) = create_test_app();

    let (status, _) = send_raw(&app, "GET", endpoints::ADD_QUERY, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = post(&app, endpoints::GET_QUERIES, json!({"query": "x", "items": 1})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    // The rejected POST must not have written anything
    let queries: Vec<Query> = get_json(&app, endpoints::GET_QUERIES).await;
    assert!(queries.is_empty());
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (app, _temp) = create_test_app();

    let (status, bytes) = send_raw(&app, "GET", "/api/dropTables", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&bytes), "not found");
}

#[tokio::test]
async fn test_malformed_bodies_are_client_errors() {
    let (app, _temp) = create_test_app();

    // Not JSON
    let body = Some("{not json".to_string());
    let (status, _) = send_raw(&app, "POST", endpoints::ADD_QUERY, body).await;
    assert!(status.is_client_error());

    // Missing field
    let (status, _) = post(&app, endpoints::ADD_QUERY, json!({"query": "laptop"})).await;
    assert!(status.is_client_error());

    // Wrong type
    let (status, _) = post(&app, endpoints::DELETE_ITEM, json!({"id": "7"})).await;
    assert!(status.is_client_error());

    // Unknown field
    let body = json!({"id": "laptop", "cascade": true});
    let (status, _) = post(&app, endpoints::DELETE_QUERY, body).await;
    assert!(status.is_client_error());

    // Missing body
    let (status, _) = send_raw(&app, "POST", endpoints::RENAME_ITEM, None).await;
    assert!(status.is_client_error());

    // Empty name
    let (status, bytes) = post(&app, endpoints::RENAME_ITEM, json!({"id": 1, "name": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&bytes), "name must not be empty");
}

#[tokio::test]
async fn test_store_timeout_is_opaque_500() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    config.operation_timeout_ms = 0;
    let state = Arc::new(AppState::new(config).unwrap());
    let app = routes::router(state.clone());

    let batch: Vec<Value> = (0..10_000)
        .map(|n| json!({"query": format!("query-{}", n), "items": n}))
        .collect();
    let (status, bytes) = post(&app, endpoints::ADD_QUERIES, Value::Array(batch)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&bytes), "storage operation timed out");

    // A write reported as failed must not land afterwards. The writer is
    // FIFO, so this read runs once the abandoned batch has been handled.
    let patient = state.store.with_timeout(Duration::from_secs(5));
    assert!(patient.queries().await.unwrap().is_empty());
    drop(patient);
    drop(app);
    drop(state);

    let store = CatalogStore::open(&temp_dir.path().join("test.db")).unwrap();
    assert!(store.queries().unwrap().is_empty());
}

#[tokio::test]
async fn test_health() {
    let (app, _temp) = create_test_app();

    let body: Value = get_json(&app, endpoints::HEALTH).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["operation_timeout_ms"], 5000);
}
