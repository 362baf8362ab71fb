//! Quill Core
//!
//! Core types shared by the Quill content pipeline services.
//!
//! This crate contains:
//! - Domain types: Core business entities (ContentItem, PipelineStatus, etc.)
//! - DTOs: Request/response bodies exchanged over the orchestrator HTTP API

pub mod domain;
pub mod dto;
