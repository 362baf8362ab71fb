//! Pipeline run DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pipeline::PipelineStatus;

/// Request to start a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

/// Returned when a run was accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: String,
    pub run_id: Uuid,
    pub topic: String,
}

/// Returned when a stop request was carried out
///
/// `termination_confirmed` is false when the process had not exited by the
/// time the orchestrator stopped waiting for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResponse {
    pub message: String,
    pub termination_confirmed: bool,
    pub exit_code: Option<i32>,
}

/// Pipeline status plus the current queue length
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: PipelineStatus,
    pub queue_length: usize,
}
