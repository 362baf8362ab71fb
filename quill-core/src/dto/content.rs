//! Content queue DTOs

use serde::{Deserialize, Serialize};

use crate::domain::content::{ContentItem, ContentStatus};

/// Partial update of a queued item
///
/// Every provided field overwrites the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// The full queue in insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub queue: Vec<ContentItem>,
    pub total: usize,
}

impl From<Vec<ContentItem>> for QueueResponse {
    fn from(queue: Vec<ContentItem>) -> Self {
        let total = queue.len();
        Self { queue, total }
    }
}
