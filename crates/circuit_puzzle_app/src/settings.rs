// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player settings stored as RON.

use circuit_puzzle_graph::{LayoutConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.ron";

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Format version
    pub version: u32,
    /// Root of the level directories
    #[serde(default = "default_levels_dir")]
    pub levels_dir: PathBuf,
    /// Where progress is saved
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,
    /// Canvas size used for layout output
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    /// Layout tuning
    #[serde(default)]
    pub layout: LayoutConfig,
}

fn default_levels_dir() -> PathBuf {
    PathBuf::from("levels")
}

fn default_progress_file() -> PathBuf {
    PathBuf::from("progress.ron")
}

fn default_viewport() -> Viewport {
    Viewport::new(400.0, 600.0)
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            levels_dir: default_levels_dir(),
            progress_file: default_progress_file(),
            viewport: default_viewport(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> std::io::Result<Self> {
        match Self::load(path) {
            Ok(settings) => Ok(settings),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}
