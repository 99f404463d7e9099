//! Key-value persistence capability for widget state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The widget persists exactly one value today (its trigger position), but
//! reads and writes go through [`KeyValueStore`] so hosts can back it with
//! whatever durable mechanism they have. [`MemoryStore`] serves tests and
//! ephemeral hosts; [`JsonFileStore`] keeps a flat JSON object on disk.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failed at {path}: {message}")]
    Io { path: String, message: String },
    #[error("storage data corrupt: {0}")]
    Corrupt(String),
}

// =============================================================================
// CAPABILITY
// =============================================================================

/// String-keyed, string-valued persistent storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_owned(), value.to_owned());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// Flat `{ "key": "value" }` JSON document on disk.
///
/// The whole document is re-read on `get` and rewritten on `set`. Writes go
/// to a sibling temp file first and are renamed into place so a crash never
/// leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(&e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn write_document(&self, doc: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(&e))?;
            }
        }
        let raw = serde_json::to_string_pretty(doc).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| self.io_error(&e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(&e))
    }

    fn io_error(&self, e: &std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.display().to_string(), message: e.to_string() }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut doc = self.read_document()?;
        Ok(doc.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt document is replaced rather than blocking every future write.
        let mut doc = match self.read_document() {
            Ok(doc) => doc,
            Err(StorageError::Corrupt(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "storage: discarding corrupt document");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        doc.insert(key.to_owned(), value.to_owned());
        self.write_document(&doc)
    }
}
