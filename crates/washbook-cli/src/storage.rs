//! Durable key/value storage for the session.
//!
//! The session is mirrored under two string keys, the way a browser keeps it
//! in `localStorage`. The CLI persists the map to `~/.washbook/storage.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use washbook_core::{Error, Result};

/// Minimal string key/value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// JSON-file backed store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `~/.washbook/storage.json`.
    pub fn open_default() -> Result<Self> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| Error::Storage("Cannot determine home directory".into()))
    }

    /// Path to the storage file: `~/.washbook/storage.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".washbook").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty map; an unreadable one is an error so that
    /// session restore can treat it as corrupt.
    fn load(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s).map_err(|e| {
                Error::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A corrupt file is overwritten rather than blocking new writes.
        let mut map = self.load().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.load() {
            Ok(mut map) => {
                if map.remove(key).is_some() {
                    self.save(&map)?;
                }
                Ok(())
            }
            // Nothing in a corrupt file is recoverable; start over.
            Err(_) => self.save(&BTreeMap::new()),
        }
    }
}

/// In-process store, used by tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            map: Mutex::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("storage.json"));

        assert_eq!(store.get("currentUser").unwrap(), None);
        store.set("currentUser", r#"{"id":1}"#).unwrap();
        store.set("isAdmin", "false").unwrap();
        assert_eq!(store.get("isAdmin").unwrap().as_deref(), Some("false"));

        // A second handle sees the same data.
        let reopened = FileStore::new(store.path());
        assert_eq!(
            reopened.get("currentUser").unwrap().as_deref(),
            Some(r#"{"id":1}"#)
        );

        store.remove("currentUser").unwrap();
        assert_eq!(reopened.get("currentUser").unwrap(), None);
        assert_eq!(reopened.get("isAdmin").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn corrupt_file_reads_as_error_but_can_be_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{oops").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(store.get("isAdmin"), Err(Error::Storage(_))));
        store.set("isAdmin", "true").unwrap();
        assert_eq!(store.get("isAdmin").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn default_path_contains_washbook() {
        if let Some(path) = FileStore::default_path() {
            assert!(path.to_string_lossy().contains(".washbook"));
            assert!(path.to_string_lossy().contains("storage.json"));
        }
    }

    #[test]
    fn memory_store_basics() {
        let store = MemoryStore::with_entries([("a", "1")]);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}
