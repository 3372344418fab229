//! Configuration for hunkwise
//!
//! Supports loading from `.hunkwise.toml` (workspace) or `<config dir>/hunkwise/config.toml` (global).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::chunk::DEFAULT_MIN_GAP_SIZE;
use crate::core::diff::DiffOptions;

/// Workspace-local config filename
pub const CONFIG_FILE: &str = ".hunkwise.toml";

/// Full hunkwise configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct HunkwiseConfig {
    /// Chunking and session settings
    pub review: ReviewConfig,

    /// Diff cleanup settings
    pub diff: DiffConfig,
}

/// Review configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    /// Unchanged characters needed between two edits to keep them in separate chunks
    /// Default: 50
    pub min_gap_size: usize,

    /// Maximum age in hours before an unfinished review is dropped
    /// Default: 24 hours
    pub max_session_age_hours: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_gap_size: DEFAULT_MIN_GAP_SIZE,
            max_session_age_hours: 24,
        }
    }
}

/// Diff configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiffConfig {
    /// Merge tiny coincidental matches into the surrounding edits
    pub semantic_cleanup: bool,

    /// Move edits onto word and line boundaries where possible
    pub align_word_boundaries: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        let options = DiffOptions::default();
        Self {
            semantic_cleanup: options.semantic_cleanup,
            align_word_boundaries: options.align_word_boundaries,
        }
    }
}

impl DiffConfig {
    pub fn options(&self) -> DiffOptions {
        DiffOptions {
            semantic_cleanup: self.semantic_cleanup,
            align_word_boundaries: self.align_word_boundaries,
        }
    }
}

impl HunkwiseConfig {
    /// Load configuration from the workspace root, falling back to global config
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let local_config = Self::workspace_config_path(workspace_root);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::global_config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration, logging and falling back to defaults on any error
    pub fn load_or_default(workspace_root: &Path) -> Self {
        match Self::load(workspace_root) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("failed to load config, using defaults: {:#}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get global config path (`<config dir>/hunkwise/config.toml`)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hunkwise").join("config.toml"))
    }

    /// Get workspace-local config path
    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(CONFIG_FILE)
    }
}
