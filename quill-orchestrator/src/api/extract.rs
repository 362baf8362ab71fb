//! Request extractors
//!
//! Wrappers around axum's `Path` and `Json` whose rejections go through
//! [`ApiError`], so malformed input gets the same `{"error": ...}` body as
//! every other failure.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::api::AppState;
use crate::api::error::ApiError;

/// Content item ID taken from the `{id}` path segment
///
/// A segment that is not a valid ID cannot name an existing item, so it is
/// reported as not found.
#[derive(Debug, Clone, Copy)]
pub struct ItemId(pub u64);

impl FromRequestParts<AppState> for ItemId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        raw.parse()
            .map(ItemId)
            .map_err(|_| ApiError::NotFound(format!("Content {} not found", raw)))
    }
}

/// JSON request body
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T> FromRequest<AppState> for JsonBody<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| {
                ApiError::BadRequest(format!("Invalid request body: {}", e.body_text()))
            })?;

        Ok(Self(value))
    }
}
