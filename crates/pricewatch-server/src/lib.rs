//! pricewatch server library - JSON HTTP API over the catalog store.
//!
//! Separated from main.rs so integration tests can drive the router directly.

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod routes;
pub mod state;
