//! Client-side key/value storage for the anonymous cart.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use rustc_hash::FxHashMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by cart storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The stored value did not parse.
    #[error("stored cart is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A stored line could not be turned back into a cart line.
    #[error("stored line for product {product} is invalid: {reason}")]
    Corrupt {
        /// Product of the offending line
        product: Uuid,

        /// Why the line was rejected
        reason: String,
    },

    /// A writer panicked while holding the in-memory store.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String values under string keys, like browser local storage.
pub trait CartStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        entries.remove(key);

        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store files in `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored values.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // The target is replaced by rename, never written in place.
        let path = self.path(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_storage_round_trips() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.load("cart")?, None);

        storage.save("cart", "[]")?;

        assert_eq!(storage.load("cart")?.as_deref(), Some("[]"));

        storage.remove("cart")?;
        storage.remove("cart")?;

        assert_eq!(storage.load("cart")?, None);

        Ok(())
    }

    #[test]
    fn file_storage_persists_between_instances() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStorage::new(dir.path()).save("bazaar.cart", r#"[{"a":1}]"#)?;

        let reopened = FileStorage::new(dir.path());

        assert_eq!(
            reopened.load("bazaar.cart")?.as_deref(),
            Some(r#"[{"a":1}]"#)
        );
        assert!(dir.path().join("bazaar.cart.json").exists());

        Ok(())
    }

    #[test]
    fn file_storage_remove_is_idempotent() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());

        storage.remove("bazaar.cart")?;
        storage.save("bazaar.cart", "[]")?;
        storage.remove("bazaar.cart")?;

        assert_eq!(storage.load("bazaar.cart")?, None);

        Ok(())
    }
}
