//! Health Check API Handler
//!
//! Liveness probe. Does not touch the pipeline or the queue.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
