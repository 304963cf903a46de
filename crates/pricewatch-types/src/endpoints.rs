//! HTTP paths shared by the server and its clients.

/// `GET` → `Query[]`
pub const GET_QUERIES: &str = "/api/getQueries";
/// `POST Query` → 204
pub const ADD_QUERY: &str = "/api/addQuery";
/// `POST Query[]` → 204
pub const ADD_QUERIES: &str = "/api/addQueries";
/// `POST {id: string}` → 204
pub const DELETE_QUERY: &str = "/api/deleteQuery";
/// `GET` → `Item[]`
pub const GET_ITEMS: &str = "/api/getItems";
/// `POST string[]` → `Item[]`
pub const GET_ITEMS_QUERIES: &str = "/api/getItemsQueries";
/// `POST NewItem` → `{id}`
pub const ADD_ITEM: &str = "/api/addItem";
/// `POST NewItem[]` → `{ids}`
pub const ADD_ITEMS: &str = "/api/addItems";
/// `POST {id: integer}` → 204
pub const DELETE_ITEM: &str = "/api/deleteItem";
/// `POST {id: integer, name: string}` → 204
pub const RENAME_ITEM: &str = "/api/renameItem";
pub const HEALTH: &str = "/api/health";
