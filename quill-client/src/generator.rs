//! Generator config and published output endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use quill_core::dto::MessageResponse;
use quill_core::dto::config::{ConfigPatch, GeneratorConfigView};
use quill_core::dto::output::OutputListing;

impl OrchestratorClient {
    /// Sanitized generator configuration
    pub async fn get_config(&self) -> Result<GeneratorConfigView> {
        let response = self.client.get(self.url("/pipeline/config")).send().await?;

        self.handle_response(response).await
    }

    /// Merge `patch` into the generator configuration
    pub async fn update_config(&self, patch: &ConfigPatch) -> Result<MessageResponse> {
        let response = self
            .client
            .post(self.url("/pipeline/config"))
            .json(patch)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Files in the published output directory
    pub async fn list_output(&self) -> Result<OutputListing> {
        let response = self.client.get(self.url("/pipeline/output")).send().await?;

        self.handle_response(response).await
    }
}
