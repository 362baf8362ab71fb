//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod extract;
pub mod generator;
pub mod health;
pub mod pipeline;
pub mod queue;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::repository::InMemoryContentRepository;
use crate::runner::{CommandRunner, ProbingResolver};
use crate::service::{
    FilePublisher, GeneratorConfigService, OutputService, PipelineOrchestrator, QueueService,
    RunSettings,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineOrchestrator,
    pub queue: Arc<QueueService>,
    pub generator_config: Arc<GeneratorConfigService>,
    pub output: Arc<OutputService>,
}

impl AppState {
    /// Wires the production services described by `config`
    pub fn from_config(config: &Config) -> Self {
        let resolver = ProbingResolver::from_config(config);
        let core_dir = resolver.core_dir();

        let queue = Arc::new(QueueService::new(
            Arc::new(InMemoryContentRepository::new()),
            Arc::new(FilePublisher::new(&config.published_dir)),
        ));
        let pipeline = PipelineOrchestrator::new(
            queue.clone(),
            Arc::new(CommandRunner::new()),
            Arc::new(resolver),
            RunSettings::from_config(config),
        );

        Self {
            pipeline,
            queue,
            generator_config: Arc::new(GeneratorConfigService::in_core_dir(&core_dir)),
            output: Arc::new(OutputService::new(&config.published_dir)),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Run control
        .route("/pipeline/status", get(pipeline::get_status))
        .route("/pipeline/generate", post(pipeline::generate))
        .route("/pipeline/stop", post(pipeline::stop))
        // Review queue
        .route("/pipeline/queue", get(queue::list_queue))
        .route(
            "/pipeline/queue/{id}",
            get(queue::get_item)
                .put(queue::update_item)
                .delete(queue::delete_item),
        )
        .route("/pipeline/publish/{id}", post(queue::publish_item))
        // Generator config and output
        .route(
            "/pipeline/config",
            get(generator::get_config).post(generator::update_config),
        )
        .route("/pipeline/output", get(generator::list_output))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
