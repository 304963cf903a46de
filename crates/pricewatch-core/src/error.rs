//! Error types for the catalog store.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store operation {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Store writer is not running")]
    Unavailable,
}

impl StoreError {
    /// Short description that is safe to hand to API clients.
    ///
    /// Never includes SQL text or engine detail.
    pub fn summary(&self) -> &'static str {
        match self {
            StoreError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                "constraint violation"
            }
            StoreError::Database(rusqlite::Error::SqliteFailure(e, _))
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                "storage busy"
            }
            StoreError::Database(_) => "storage operation failed",
            StoreError::Io(_) => "storage I/O failure",
            StoreError::Timeout { .. } => "storage operation timed out",
            StoreError::Unavailable => "storage unavailable",
        }
    }
}
