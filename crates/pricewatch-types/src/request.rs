//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/deleteQuery`. `id` is the query key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteQueryRequest {
    pub id: String,
}

/// Body of `POST /api/getItemsQueries`: a bare array of query keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKeys(pub Vec<String>);

impl QueryKeys {
    /// Keys with repeats removed, first occurrence kept.
    pub fn distinct(self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.0
            .into_iter()
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

/// Body of `POST /api/deleteItem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteItemRequest {
    pub id: i64,
}

/// Body of `POST /api/renameItem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameItemRequest {
    pub id: i64,
    pub name: String,
}

/// Response of `POST /api/addItem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub id: i64,
}

/// Response of `POST /api/addItems`. Ids are in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsResponse {
    pub ids: Vec<i64>,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
