use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::session::ReviewRegistry;

/// Live review state filename
pub const PENDING_FILE: &str = ".hunkwise-pending.json";

/// Manager for persisting live reviews to disk between invocations
pub struct PendingStore {
    /// Path to the pending file
    file_path: PathBuf,
}

impl PendingStore {
    /// Create a store for the given workspace root
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            file_path: workspace_root.join(PENDING_FILE),
        }
    }

    /// Load live reviews from disk
    pub fn load(&self) -> Result<Option<ReviewRegistry>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path)
            .context("Failed to read pending review file")?;

        match serde_json::from_str::<ReviewRegistry>(&content) {
            Ok(registry) => Ok(Some(registry)),
            Err(err) => {
                tracing::warn!(
                    path = %self.file_path.display(),
                    "ignoring unreadable pending review file: {}",
                    err
                );
                Ok(None)
            }
        }
    }

    /// Load live reviews, dropping any older than `max_age_hours`
    pub fn load_with_max_age(&self, max_age_hours: i64) -> Result<ReviewRegistry> {
        let mut registry = self.load()?.unwrap_or_default();
        let dropped = registry.prune_stale(max_age_hours);
        if dropped > 0 {
            self.save(&registry)?;
        }
        Ok(registry)
    }

    /// Save live reviews to disk, removing the file once nothing is left
    pub fn save(&self, registry: &ReviewRegistry) -> Result<()> {
        if registry.is_empty() {
            return self.delete();
        }

        let content = serde_json::to_string_pretty(registry)
            .context("Failed to serialize pending reviews")?;
        fs::write(&self.file_path, content).context("Failed to write pending review file")?;
        Ok(())
    }

    /// Delete the pending file
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete pending review file")?;
        }
        Ok(())
    }

    /// Check if pending file exists
    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
