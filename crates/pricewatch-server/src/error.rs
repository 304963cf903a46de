//! API error type and its HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pricewatch_core::StoreError;
use pricewatch_types::{ErrorResponse, ValidationError};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body decoded but failed shape validation.
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// Body could not be decoded at all.
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },

    #[error("not found")]
    NotFound,

    #[error("method not supported")]
    MethodNotAllowed,

    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wrap a store failure with the name of the operation that hit it.
    pub fn store(operation: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Malformed { status, .. } => *status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store { operation, source } => {
                error!(
                    target: "pricewatch::api",
                    "Store operation {} failed: {}",
                    operation,
                    source
                );
                source.summary().to_string()
            }
            ApiError::NotFound | ApiError::MethodNotAllowed => self.to_string(),
            ApiError::Invalid(_) | ApiError::Malformed { .. } => {
                debug!(target: "pricewatch::api", "Rejected request body: {}", self);
                self.to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_store_errors_map_to_500_with_summary() {
        let err = ApiError::store("items")(StoreError::Timeout {
            operation: "items",
            after: Duration::from_secs(5),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        let err = ApiError::from(ValidationError::Empty { field: "query" });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "query must not be empty");
    }
}
