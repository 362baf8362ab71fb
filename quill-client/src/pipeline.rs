//! Run control endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use quill_core::dto::pipeline::{GenerateRequest, GenerateResponse, StatusResponse, StopResponse};

impl OrchestratorClient {
    // =============================================================================
    // Run Control
    // =============================================================================

    /// Current pipeline status, including buffered output and queue length
    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self.client.get(self.url("/pipeline/status")).send().await?;

        self.handle_response(response).await
    }

    /// Start a generation run
    ///
    /// # Arguments
    /// * `topic` - Topic for the generator; `None` uses the orchestrator default
    ///
    /// # Errors
    /// An `ApiError` with status 409 when a run is already in progress
    pub async fn generate(&self, topic: Option<&str>) -> Result<GenerateResponse> {
        let req = GenerateRequest {
            topic: topic.map(str::to_string),
        };
        tracing::debug!("Requesting run (topic: {:?})", req.topic);

        let response = self
            .client
            .post(self.url("/pipeline/generate"))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Stop the active run
    ///
    /// Returns once the orchestrator either saw the process exit or gave up
    /// waiting; `termination_confirmed` tells which.
    pub async fn stop(&self) -> Result<StopResponse> {
        let response = self.client.post(self.url("/pipeline/stop")).send().await?;

        self.handle_response(response).await
    }
}
