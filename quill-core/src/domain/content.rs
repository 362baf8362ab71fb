//! Content domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unit of generated content awaiting editorial review
///
/// Created by the orchestrator when a generation run exits successfully.
/// Every later change goes through the queue service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: u64,
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub status: ContentStatus,
    /// Captured stdout of the run that produced this item
    pub output: String,
    /// Editor's revision of the output, if any
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    /// Creates a freshly generated item in `pending_review`
    pub fn new(id: u64, topic: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id,
            topic: topic.into(),
            generated_at: Utc::now(),
            status: ContentStatus::PendingReview,
            output: output.into(),
            content: None,
            updated_at: None,
            published_at: None,
        }
    }

    /// The text that gets published: the edited revision when present,
    /// the raw generator output otherwise
    pub fn body(&self) -> &str {
        self.content.as_deref().unwrap_or(&self.output)
    }
}

/// Review workflow state of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    PendingReview,
    Approved,
    Rejected,
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::PendingReview => "pending_review",
            ContentStatus::Approved => "approved",
            ContentStatus::Rejected => "rejected",
            ContentStatus::Published => "published",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending_review" | "pending" => Ok(ContentStatus::PendingReview),
            "approved" => Ok(ContentStatus::Approved),
            "rejected" => Ok(ContentStatus::Rejected),
            "published" => Ok(ContentStatus::Published),
            other => Err(format!("Unknown content status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_is_pending_review() {
        let item = ContentItem::new(1, "rust", "hello");
        assert_eq!(item.status, ContentStatus::PendingReview);
        assert!(item.updated_at.is_none());
        assert!(item.published_at.is_none());
    }

    #[test]
    fn test_body_prefers_edited_content() {
        let mut item = ContentItem::new(1, "rust", "raw");
        assert_eq!(item.body(), "raw");

        item.content = Some("edited".to_string());
        assert_eq!(item.body(), "edited");
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&ContentStatus::PendingReview).unwrap();
        assert_eq!(json, "\"pending_review\"");

        let status: ContentStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, ContentStatus::Approved);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "pending-review".parse::<ContentStatus>(),
            Ok(ContentStatus::PendingReview)
        );
        assert_eq!("Rejected".parse::<ContentStatus>(), Ok(ContentStatus::Rejected));
        assert!("archived".parse::<ContentStatus>().is_err());
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let item = ContentItem::new(42, "topic-A", "ok");
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["id"], 42);
        assert_eq!(value["status"], "pending_review");
        assert!(value.get("generatedAt").is_some());
        assert!(value["publishedAt"].is_null());
    }
}
