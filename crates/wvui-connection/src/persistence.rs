//! Key/value persistence for connection data
//!
//! The store only needs three string-keyed entries, so the adapter contract
//! is a plain `get`/`set`/`remove` of strings. Values are JSON blobs or plain
//! ids; interpreting them is the caller's job, and callers must tolerate
//! missing or corrupted values.
//!
//! Two implementations are provided:
//! - `MemoryStore`: process-local map, used by tests and ephemeral sessions
//! - `FileStore`: every key kept in one JSON object file on disk

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use wvui_core::{Result, WvError};

/// Keys under which connection data is persisted
pub struct StorageKeys;

impl StorageKeys {
    /// JSON array of connection profiles
    pub const CONNECTIONS: &'static str = "weaviate_connections";
    /// Id of the active profile, or an empty string
    pub const ACTIVE_CONNECTION: &'static str = "weaviate_active_connection";
    /// Reserved; nothing reads or writes it yet
    pub const CONNECTION_HISTORY: &'static str = "weaviate_connection_history";
}

/// Durable string-keyed storage
///
/// No transactional guarantees; last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file
///
/// The file holds one JSON object mapping keys to string values. It is read
/// lazily on first access and rewritten in full on every change. An
/// unreadable or corrupt file is treated as empty.
pub struct FileStore {
    path: PathBuf,
    /// Loaded on first access
    cache: RwLock<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Create a store for the given file. Nothing is read until first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::debug!(path = %path.display(), "file store initialized");
        Self {
            path,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no storage file found, starting fresh");
                return BTreeMap::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to read storage file, starting fresh: {}", e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "loaded entries from storage file");
                entries
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to parse storage file, starting fresh: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn save_to_disk(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                WvError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content).map_err(|e| {
            WvError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(count = entries.len(), path = %self.path.display(), "saved storage file");
        Ok(())
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> T {
        let mut cache = self.cache.write();
        let entries = cache.get_or_insert_with(|| self.load_from_disk());
        f(entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            let previous = entries.insert(key.to_string(), value.to_string());
            let saved = self.save_to_disk(entries);
            if saved.is_err() {
                // Keep the cache in step with what is on disk.
                match previous {
                    Some(previous) => entries.insert(key.to_string(), previous),
                    None => entries.remove(key),
                };
            }
            saved
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| match entries.remove(key) {
            Some(previous) => {
                let saved = self.save_to_disk(entries);
                if saved.is_err() {
                    entries.insert(key.to_string(), previous);
                }
                saved
            }
            None => Ok(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.is_empty());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::new(&path);
        store.set(StorageKeys::ACTIVE_CONNECTION, "conn_1").unwrap();
        store.set(StorageKeys::CONNECTIONS, "[]").unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(StorageKeys::ACTIVE_CONNECTION).as_deref(),
            Some("conn_1")
        );
        reopened.remove(StorageKeys::ACTIVE_CONNECTION).unwrap();

        let again = FileStore::new(&path);
        assert!(again.get(StorageKeys::ACTIVE_CONNECTION).is_none());
        assert_eq!(again.get(StorageKeys::CONNECTIONS).as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_treats_corrupt_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get(StorageKeys::CONNECTIONS).is_none());

        store.set(StorageKeys::CONNECTIONS, "[]").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
