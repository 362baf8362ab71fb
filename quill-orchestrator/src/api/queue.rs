//! Queue API Handlers
//!
//! HTTP endpoints for the content review workflow.

use axum::{Json, extract::State};
use quill_core::domain::content::ContentItem;
use quill_core::dto::content::{QueueResponse, UpdateContent};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ItemId, JsonBody};

/// GET /pipeline/queue
/// List the content queue
pub async fn list_queue(State(state): State<AppState>) -> ApiResult<Json<QueueResponse>> {
    tracing::debug!("Listing content queue");

    let items = state.queue.list().await?;
    Ok(Json(QueueResponse::from(items)))
}

/// GET /pipeline/queue/{id}
/// Get a content item
pub async fn get_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> ApiResult<Json<ContentItem>> {
    tracing::debug!("Getting content item: {}", id);

    let item = state.queue.get(id).await?;
    Ok(Json(item))
}

/// PUT /pipeline/queue/{id}
/// Approve, reject or edit a content item
pub async fn update_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
    JsonBody(req): JsonBody<UpdateContent>,
) -> ApiResult<Json<ContentItem>> {
    tracing::info!("Updating content item: {}", id);

    let item = state.queue.update(id, req).await?;
    Ok(Json(item))
}

/// DELETE /pipeline/queue/{id}
/// Remove a content item
pub async fn delete_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> ApiResult<Json<ContentItem>> {
    tracing::info!("Deleting content item: {}", id);

    let removed = state.queue.remove(id).await?;
    Ok(Json(removed))
}

/// POST /pipeline/publish/{id}
/// Publish an approved content item
pub async fn publish_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> ApiResult<Json<ContentItem>> {
    tracing::info!("Publishing content item: {}", id);

    let item = state.queue.publish(id).await?;
    Ok(Json(item))
}
