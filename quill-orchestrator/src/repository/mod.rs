//! Repository Module
//!
//! Data access layer for the orchestrator.
//! The content queue is stored behind a trait so a durable backend can be
//! swapped in without touching the queue service.

pub mod content;

// Re-export for convenience
pub use content::{ContentRepository, InMemoryContentRepository, RepositoryError};
