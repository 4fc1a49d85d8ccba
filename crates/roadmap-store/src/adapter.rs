//! Key → JSON persistence
//!
//! Provides the [`PersistenceAdapter`] trait and two device-local backends:
//! [`MemoryStore`] (session only, optional byte quota) and [`FileStore`]
//! (one JSON document per device profile, survives restarts).

use crate::error::StoreError;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// Device-local key/value store holding JSON values
pub trait PersistenceAdapter {
    /// Read a value; `Ok(None)` when the key was never written
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the backend rejects the write
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

impl<T: PersistenceAdapter + ?Sized> PersistenceAdapter for &T {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<T: PersistenceAdapter + ?Sized> PersistenceAdapter for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<T: PersistenceAdapter + ?Sized> PersistenceAdapter for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store, values kept as serialized text like a browser's storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rejecting writes that push total size past `bytes`
    #[inline]
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Seed a raw text value, bypassing serialization
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries.lock().insert(key.into(), raw.into());
    }

    /// Raw stored text for a key
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.entries.lock();
        let Some(raw) = guard.get(key) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(raw)?))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&value)?;
        let mut guard = self.entries.lock();

        if let Some(limit) = self.quota {
            let others: usize = guard
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + raw.len() > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }

        guard.insert(key.to_string(), raw);
        Ok(())
    }
}

/// JSON-object file holding every key of one device profile
///
/// The file is read once at open and rewritten atomically on every `set`.
/// A missing file is an empty store; an unreadable or non-object file is
/// treated as empty as well and replaced on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_document(&path) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable state file");
                Map::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        match serde_json::from_str(&text)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn write_document(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io_error(&dir, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io_error(&dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, map)?;
        tmp.flush().map_err(|e| StoreError::io_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io_error(&self.path, e.error))?;
        Ok(())
    }
}

impl PersistenceAdapter for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut guard = self.entries.lock();
        let previous = guard.insert(key.to_string(), value);

        if let Err(err) = self.write_document(&guard) {
            // keep memory and disk in agreement
            match previous {
                Some(old) => guard.insert(key.to_string(), old),
                None => guard.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}
