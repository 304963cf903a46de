//! Shared application state.

use crate::config::Config;
use pricewatch_core::{CatalogStore, StoreHandle};

/// Shared application state.
pub struct AppState {
    pub store: StoreHandle,
    pub config: Config,
}

impl AppState {
    /// Open the configured database and start its writer.
    pub fn new(config: Config) -> pricewatch_core::Result<Self> {
        let store = CatalogStore::open(&config.db_path)?;
        Self::with_store(store, config)
    }

    /// Build state around an already opened store.
    pub fn with_store(store: CatalogStore, config: Config) -> pricewatch_core::Result<Self> {
        let store = StoreHandle::spawn(store, config.store_config())?;
        Ok(Self { store, config })
    }
}
