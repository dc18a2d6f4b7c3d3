//! Local-storage style key/value persistence.
//!
//! The browser front-end keeps its auth session, seller-name cache and
//! cross-window signals in local storage. [`Storage`] is the same contract:
//! string keys to string values, synchronous, last writer wins.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the backend's size limit.
    #[error("Storage quota exceeded while writing {0}")]
    QuotaExceeded(String),

    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file or a stored value is not valid JSON.
    #[error("Corrupt storage data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key/value store with local-storage semantics.
pub trait Storage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::QuotaExceeded` if the backend is full.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage, optionally limited to a byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Unlimited in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory storage that rejects writes once keys plus values exceed
    /// `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded(key.to_string()));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage persisted as one JSON object in a file.
///
/// Every operation re-reads the file so separate processes sharing the
/// file see each other's writes (last writer wins).
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open (or lazily create) storage at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, text).map_err(|e| {
            if e.kind() == std::io::ErrorKind::StorageFull {
                StorageError::QuotaExceeded(self.path.display().to_string())
            } else {
                StorageError::Io(e)
            }
        })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("a", "12345").unwrap();
        let err = storage.set("b", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded(key) if key == "b"));

        // Overwriting an existing key only counts the new value
        storage.set("a", "123456789").unwrap();
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let first = FileStorage::new(&path);
        first.set("evtb_auth", "{\"token\":\"abc\"}").unwrap();

        let second = FileStorage::new(&path);
        assert_eq!(
            second.get("evtb_auth").unwrap().as_deref(),
            Some("{\"token\":\"abc\"}")
        );
        second.remove("evtb_auth").unwrap();
        assert_eq!(first.get("evtb_auth").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("anything").unwrap(), None);
        storage.remove("anything").unwrap();
    }
}
