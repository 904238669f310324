//! Recorder settings
//!
//! Configuration for where recordings are stored and how export behaves.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the diagnostic recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderSettings {
    /// Root directory override. When `None`, recordings live under the
    /// user's document directory (falling back to the local data dir).
    pub base_dir: Option<PathBuf>,

    /// Name of the top-level recording folder
    pub folder_name: String,

    /// Whether a successful export hands the archive to the platform
    /// file browser
    pub reveal_on_export: bool,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            base_dir: None,
            folder_name: "Recording".to_string(),
            reveal_on_export: true,
        }
    }
}

impl RecorderSettings {
    /// Resolve the logging root this recorder writes under
    pub fn resolve_root(&self) -> PathBuf {
        let base = self
            .base_dir
            .clone()
            .or_else(dirs::document_dir)
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(&self.folder_name)
    }
}
