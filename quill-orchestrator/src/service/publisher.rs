//! Publisher
//!
//! The external side effect of publishing a content item. The queue service
//! calls it before marking an item published.

use async_trait::async_trait;
use quill_core::domain::content::ContentItem;
use std::path::PathBuf;
use thiserror::Error;

/// Longest slug kept in a published file name
const MAX_SLUG_LEN: usize = 60;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Publishing rejected: {0}")]
    Rejected(String),
}

/// Pushes approved content to its destination
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, item: &ContentItem) -> Result<(), PublishError>;
}

/// Writes each published item as a markdown file
///
/// Files are named `<id>-<slug>.md` and land in the directory the output
/// listing reads from.
#[derive(Debug, Clone)]
pub struct FilePublisher {
    dir: PathBuf,
}

impl FilePublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, item: &ContentItem) -> PathBuf {
        self.dir.join(format!("{}-{}.md", item.id, slugify(&item.topic)))
    }
}

#[async_trait]
impl Publisher for FilePublisher {
    async fn publish(&self, item: &ContentItem) -> Result<(), PublishError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PublishError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(item);
        let document = format!("# {}\n\n{}\n", item.topic, item.body().trim_end());

        tokio::fs::write(&path, document)
            .await
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Published content {} to {}", item.id, path.display());
        Ok(())
    }
}

/// Lowercase ASCII slug of `text`, `content` when nothing usable remains
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "content".to_string()
    } else {
        slug.to_string()
    }
}
