//! Storage configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed key the saved schema list lives under.
pub const DEFAULT_STORAGE_KEY: &str = "formBuilder_savedForms";

/// Where and under which key saved schemas are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key of the saved-schema blob
    pub key: String,
    /// Directory used by file-backed storage
    pub directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            directory: PathBuf::from("."),
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "This method returns a new StorageConfig and does not modify self"]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use = "This method returns a new StorageConfig and does not modify self"]
    pub fn with_directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }
}
