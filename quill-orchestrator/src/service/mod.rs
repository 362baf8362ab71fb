//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sit between the HTTP handlers and the runner/repository layers.

pub mod generator_config;
pub mod output;
pub mod pipeline;
pub mod publisher;
pub mod queue;

// Re-export for convenience
pub use generator_config::{ConfigError, GeneratorConfigService};
pub use output::{OutputError, OutputService};
pub use pipeline::{PipelineError, PipelineOrchestrator, RunAccepted, RunSettings, StopOutcome};
pub use publisher::{FilePublisher, PublishError, Publisher};
pub use queue::{QueueError, QueueService};
