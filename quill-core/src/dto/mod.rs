//! Data Transfer Objects for the orchestrator HTTP API
//!
//! Request and response bodies shared by the orchestrator (which produces
//! them) and the client (which consumes them). Field names are camelCase on
//! the wire.

pub mod config;
pub mod content;
pub mod output;
pub mod pipeline;

use serde::{Deserialize, Serialize};

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
