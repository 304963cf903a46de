//! Request body extraction.

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use pricewatch_types::Validate;
use serde::de::DeserializeOwned;

/// JSON body that has been decoded and validated.
///
/// Decode failures keep axum's status (400, 415 or 422); validation failures
/// become 400. Either way the handler never runs.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}
