//! Published output DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file in the published output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub name: String,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputListing {
    pub output_path: String,
    pub files: Vec<OutputFile>,
}
