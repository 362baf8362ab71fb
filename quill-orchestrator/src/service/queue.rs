//! Queue Service
//!
//! Review workflow over the content queue: listing, editing, deleting and
//! publishing generated items. Independent of whether a run is active.

use chrono::Utc;
use quill_core::domain::content::{ContentItem, ContentStatus};
use quill_core::dto::content::UpdateContent;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::repository::{ContentRepository, RepositoryError};
use crate::service::publisher::{PublishError, Publisher};

/// Service error type
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Content {0} not found")]
    NotFound(u64),

    #[error("Content {id} must be approved before publishing (current: {status})")]
    Precondition { id: u64, status: ContentStatus },

    #[error("Content {id} cannot be set to {status} directly; use publish")]
    InvalidTransition { id: u64, status: ContentStatus },

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, QueueError>;

/// Content queue service
pub struct QueueService {
    repository: Arc<dyn ContentRepository>,
    publisher: Arc<dyn Publisher>,
    ids: IdGenerator,
    /// Serializes read-modify-write operations
    write_lock: Mutex<()>,
}

impl QueueService {
    pub fn new(repository: Arc<dyn ContentRepository>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            repository,
            publisher,
            ids: IdGenerator::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// List all items in insertion order
    pub async fn list(&self) -> Result<Vec<ContentItem>> {
        Ok(self.repository.list_all().await?)
    }

    /// Number of queued items
    pub async fn count(&self) -> Result<usize> {
        Ok(self.repository.count().await?)
    }

    /// Get an item by ID
    pub async fn get(&self, id: u64) -> Result<ContentItem> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(QueueError::NotFound(id))
    }

    /// Apply a partial update
    ///
    /// Any status may be set except `published`, which only `publish` reaches.
    /// `updated_at` is refreshed even when no field was provided.
    pub async fn update(&self, id: u64, req: UpdateContent) -> Result<ContentItem> {
        let _guard = self.write_lock.lock().await;

        let mut item = self.get(id).await?;

        if let Some(status) = req.status {
            if status == ContentStatus::Published && item.status != ContentStatus::Published {
                return Err(QueueError::InvalidTransition { id, status });
            }
            item.status = status;
        }
        if let Some(content) = req.content {
            item.content = Some(content);
        }
        item.updated_at = Some(Utc::now());

        self.store(&item).await?;

        tracing::info!("Content {} updated (status: {})", id, item.status);
        Ok(item)
    }

    /// Remove an item, returning it
    pub async fn remove(&self, id: u64) -> Result<ContentItem> {
        let _guard = self.write_lock.lock().await;

        let removed = self
            .repository
            .delete(id)
            .await?
            .ok_or(QueueError::NotFound(id))?;

        tracing::info!("Content {} removed from queue", id);
        Ok(removed)
    }

    /// Publish an approved item
    ///
    /// The publisher runs first; if it fails the item is left untouched.
    pub async fn publish(&self, id: u64) -> Result<ContentItem> {
        let _guard = self.write_lock.lock().await;

        let mut item = self.get(id).await?;

        if item.status != ContentStatus::Approved {
            return Err(QueueError::Precondition {
                id,
                status: item.status,
            });
        }

        self.publisher.publish(&item).await?;

        let now = Utc::now();
        item.status = ContentStatus::Published;
        item.published_at = Some(now);
        item.updated_at = Some(now);

        self.store(&item).await?;

        tracing::info!("Content {} published", id);
        Ok(item)
    }

    /// Append a freshly generated item
    ///
    /// Only the pipeline orchestrator creates items, on a successful run.
    pub(crate) async fn enqueue(&self, topic: String, output: String) -> Result<ContentItem> {
        let item = ContentItem::new(self.ids.next(), topic, output);
        self.repository.create(item.clone()).await?;

        tracing::info!("Content {} queued for review (topic: {})", item.id, item.topic);
        Ok(item)
    }

    async fn store(&self, item: &ContentItem) -> Result<()> {
        if self.repository.update(item).await? {
            Ok(())
        } else {
            Err(QueueError::NotFound(item.id))
        }
    }
}

// =============================================================================
// ID generation
// =============================================================================

/// Creation-time IDs: epoch milliseconds, bumped to stay strictly increasing
#[derive(Debug, Default)]
struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    fn next(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }
}
