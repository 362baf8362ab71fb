//! Quill orchestrator
//!
//! Supervises the external content generator, buffers its output, and runs
//! the review queue its successful runs feed.

pub mod api;
pub mod config;
pub mod repository;
pub mod runner;
pub mod service;
