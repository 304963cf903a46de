//! Catalog persistence for pricewatch.

mod db;
mod error;
mod handle;

pub use db::CatalogStore;
pub use error::StoreError;
pub use handle::{StoreHandle, StoreHandleConfig};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
