use crate::core::models::Item;
use crate::sources::ItemSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Reads a JSON array of `{"id", "status"}` objects on every snapshot.
pub struct FileItemSource {
    path: PathBuf,
}

impl FileItemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemSource for FileItemSource {
    fn snapshot(&self) -> Result<Vec<Item>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read items from {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<Item> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse items in {}", self.path.display()))?;

        tracing::debug!(path = ?self.path, count = items.len(), "Read item snapshot");
        Ok(items)
    }
}
