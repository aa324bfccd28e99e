// SPDX-License-Identifier: MIT OR Apache-2.0
//! On-disk player progress.

use circuit_puzzle_game::ProgressRecord;
use std::path::{Path, PathBuf};

/// Progress file in RON format
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Create a store for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing the store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load progress. A missing file is empty progress.
    pub fn load(&self) -> std::io::Result<ProgressRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved progress");
                return Ok(ProgressRecord::default());
            }
            Err(e) => return Err(e),
        };
        ron::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Write progress, replacing the previous file
    pub fn save(&self, progress: &ProgressRecord) -> std::io::Result<()> {
        let content = ron::ser::to_string_pretty(progress, ron::ser::PrettyConfig::default())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), levels = progress.completed_levels.len(), "progress saved");
        Ok(())
    }
}
