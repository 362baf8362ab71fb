//! Output Service
//!
//! Lists the files in the published content directory.

use chrono::{DateTime, Utc};
use quill_core::dto::output::{OutputFile, OutputListing};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to list output files in {}: {source}", .path.display())]
pub struct OutputError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub struct OutputService {
    dir: PathBuf,
}

impl OutputService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files in the published directory, sorted by name
    ///
    /// The directory is created when missing.
    pub async fn list(&self) -> Result<OutputListing, OutputError> {
        let io_err = |source: std::io::Error| OutputError {
            path: self.dir.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    // Removed between listing and stat
                    tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            files.push(OutputFile {
                name: entry.file_name().to_string_lossy().to_string(),
                size: metadata.len(),
                created: metadata.created().ok().map(DateTime::<Utc>::from),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(OutputListing {
            output_path: self.dir.display().to_string(),
            files,
        })
    }
}
