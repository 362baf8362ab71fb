//! Pipeline API Handlers
//!
//! HTTP endpoints for starting, stopping and observing generation runs.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use quill_core::dto::pipeline::{GenerateRequest, GenerateResponse, StatusResponse, StopResponse};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /pipeline/status
/// Current pipeline status and queue length
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.pipeline.status().await;
    let queue_length = state.pipeline.queue_length().await;

    Json(StatusResponse {
        status,
        queue_length,
    })
}

/// POST /pipeline/generate
/// Start a generation run
///
/// The body is optional; an empty body starts a run with the default topic.
pub async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<GenerateResponse>)> {
    let req: GenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    tracing::info!("Generate requested (topic: {:?})", req.topic);

    let accepted = state.pipeline.request_run(req.topic).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            message: "Pipeline started".to_string(),
            run_id: accepted.run_id,
            topic: accepted.topic,
        }),
    ))
}

/// POST /pipeline/stop
/// Stop the active run
pub async fn stop(State(state): State<AppState>) -> ApiResult<Json<StopResponse>> {
    tracing::info!("Stop requested");

    let outcome = state.pipeline.request_stop().await?;

    let message = if outcome.confirmed {
        "Pipeline stopped"
    } else {
        "Stop requested, termination unconfirmed"
    };

    Ok(Json(StopResponse {
        message: message.to_string(),
        termination_confirmed: outcome.confirmed,
        exit_code: outcome.exit_code,
    }))
}
