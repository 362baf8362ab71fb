//! Generator API Handlers
//!
//! Generator configuration and published output.

use axum::{Json, extract::State};
use quill_core::dto::MessageResponse;
use quill_core::dto::config::{ConfigPatch, GeneratorConfigView};
use quill_core::dto::output::OutputListing;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::JsonBody;

/// GET /pipeline/config
/// Sanitized generator configuration
pub async fn get_config(State(state): State<AppState>) -> ApiResult<Json<GeneratorConfigView>> {
    let view = state.generator_config.get().await?;
    Ok(Json(view))
}

/// POST /pipeline/config
/// Merge updates into the generator configuration
pub async fn update_config(
    State(state): State<AppState>,
    JsonBody(patch): JsonBody<ConfigPatch>,
) -> ApiResult<Json<MessageResponse>> {
    state.generator_config.update(patch).await?;
    Ok(Json(MessageResponse::new("Configuration updated")))
}

/// GET /pipeline/output
/// List published output files
pub async fn list_output(State(state): State<AppState>) -> ApiResult<Json<OutputListing>> {
    let listing = state.output.list().await?;
    Ok(Json(listing))
}
