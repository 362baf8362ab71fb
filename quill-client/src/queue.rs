//! Review queue endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use quill_core::domain::content::ContentItem;
use quill_core::dto::content::{QueueResponse, UpdateContent};

impl OrchestratorClient {
    // =============================================================================
    // Review Queue
    // =============================================================================

    /// List the content queue in insertion order
    pub async fn list_queue(&self) -> Result<QueueResponse> {
        let response = self.client.get(self.url("/pipeline/queue")).send().await?;

        self.handle_response(response).await
    }

    /// Get a content item by ID
    pub async fn get_item(&self, id: u64) -> Result<ContentItem> {
        let url = self.url(&format!("/pipeline/queue/{}", id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Update a content item's status and/or content
    pub async fn update_item(&self, id: u64, req: &UpdateContent) -> Result<ContentItem> {
        let url = self.url(&format!("/pipeline/queue/{}", id));
        let response = self.client.put(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Remove a content item, returning it
    pub async fn delete_item(&self, id: u64) -> Result<ContentItem> {
        let url = self.url(&format!("/pipeline/queue/{}", id));
        let response = self.client.delete(&url).send().await?;

        self.handle_response(response).await
    }

    /// Publish an approved content item
    pub async fn publish(&self, id: u64) -> Result<ContentItem> {
        let url = self.url(&format!("/pipeline/publish/{}", id));
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }
}
