//! Content Repository
//!
//! Storage for queued content items. Items keep their insertion order.

use async_trait::async_trait;
use indexmap::IndexMap;
use quill_core::domain::content::ContentItem;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Content item {0} already exists")]
    Duplicate(u64),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Storage for content items
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Appends a new item at the end of the queue
    async fn create(&self, item: ContentItem) -> Result<()>;

    /// Finds an item by ID
    async fn find_by_id(&self, id: u64) -> Result<Option<ContentItem>>;

    /// Lists all items in insertion order
    async fn list_all(&self) -> Result<Vec<ContentItem>>;

    /// Replaces a stored item in place, keeping its position
    ///
    /// Returns false when no item with that ID exists.
    async fn update(&self, item: &ContentItem) -> Result<bool>;

    /// Removes an item, returning it
    async fn delete(&self, id: u64) -> Result<Option<ContentItem>>;

    /// Number of stored items
    async fn count(&self) -> Result<usize>;
}

/// Memory-resident repository
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    items: RwLock<IndexMap<u64, ContentItem>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn create(&self, item: ContentItem) -> Result<()> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(RepositoryError::Duplicate(item.id));
        }
        items.insert(item.id, item);
        Ok(())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<ContentItem>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn update(&self, item: &ContentItem) -> Result<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: u64) -> Result<Option<ContentItem>> {
        Ok(self.items.write().await.shift_remove(&id))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.items.read().await.len())
    }
}
