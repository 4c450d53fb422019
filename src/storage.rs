//! Key-value persistence for history and preferences.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

/// Key holding the selected theme index.
pub const THEME_KEY: &str = "calculatorTheme";
/// Key holding the selected language code.
pub const LANGUAGE_KEY: &str = "calculatorLang";
/// Key holding the JSON-encoded history log.
pub const HISTORY_KEY: &str = "calculatorHistory";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String-valued key-value store.
///
/// Every write replaces the whole value stored under a key.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as a file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let is_plain = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values().remove(key);
        Ok(())
    }
}

/// Default data directory (cross-platform), e.g. `~/.local/share/calcpad`
/// on Linux.
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("calcpad");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(THEME_KEY).unwrap(), None);

        storage.set(THEME_KEY, "2").unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("2"));

        storage.set(THEME_KEY, "3").unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("3"));

        storage.remove(THEME_KEY).unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get(LANGUAGE_KEY).unwrap(), None);

        storage.set(LANGUAGE_KEY, "en").unwrap();
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));
        assert!(dir.path().join("nested").join(LANGUAGE_KEY).exists());

        // A second handle on the same directory sees the same data.
        let reopened = FileStorage::new(storage.dir());
        assert_eq!(reopened.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.remove(HISTORY_KEY).unwrap();

        storage.set(HISTORY_KEY, "[]").unwrap();
        storage.remove(HISTORY_KEY).unwrap();
        assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidKey("a/b".to_string());
        assert_eq!(err.to_string(), "invalid storage key: \"a/b\"");

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err: StorageError = io_err.into();
        assert!(err.to_string().contains("read-only"));
    }
}
