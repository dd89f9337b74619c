use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::PathBuf;

/// A regular file under the root directory, read live from the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

impl StoredFile {
    /// Builds the view from filesystem metadata, or `None` when the entry is
    /// not a regular file or its modification time cannot be read.
    pub(crate) fn from_metadata(name: String, metadata: &Metadata) -> Option<Self> {
        if !metadata.is_file() {
            return None;
        }

        let modified = metadata.modified().ok()?;

        Some(Self {
            name,
            size_bytes: metadata.len(),
            modified_at: DateTime::<Utc>::from(modified),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub file_count: u64,
    pub total_size_bytes: u64,
    pub root: PathBuf,
}
