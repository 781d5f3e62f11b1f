//! Key/value backends holding opaque string blobs.
use super::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub trait StorageBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// In-process storage, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let items = self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    directory: PathBuf,
}

impl FileBackend {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self { directory: directory.as_ref().to_path_buf() }
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes through a temporary file so a crash never leaves a torn blob.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.directory)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get_item("k").unwrap(), None);
        backend.set_item("k", "v").unwrap();
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_backend_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));

        assert_eq!(backend.get_item("forms").unwrap(), None);
        backend.set_item("forms", "[]").unwrap();
        assert_eq!(backend.get_item("forms").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/forms.json").exists());
    }

    #[test]
    fn test_file_backend_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(backend.set_item(key, "x"), Err(StorageError::InvalidKey(_))), "key {key:?}");
        }
    }
}
