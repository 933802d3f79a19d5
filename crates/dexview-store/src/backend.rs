//! Key-value backends.
//!
//! # Design
//! - Values are opaque strings; encoding lives in the per-key modules.
//! - A backend handle is one "context". `context()` opens another handle on
//!   the same data with its own origin id, so writes through one handle notify
//!   the others.
//! - `FileStore` keeps one file per key and writes through a temp file plus
//!   rename so readers never observe a partial value.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::events::{StorageBus, StorageSubscription};

/// Minimal string key-value store with change notifications.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backend cannot be read.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, notifying other contexts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`, notifying other contexts. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backend cannot be written.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Subscribe to writes made by other contexts.
    fn subscribe(&self) -> StorageSubscription;
}

/// In-memory backend shared between contexts.
#[derive(Debug)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    bus: StorageBus,
    origin: u64,
}

impl MemoryStore {
    /// Create an empty store with a single context.
    #[must_use]
    pub fn new() -> Self {
        let bus = StorageBus::new();
        let origin = bus.allocate_origin();
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            bus,
            origin,
        }
    }

    /// Open another context on the same data.
    #[must_use]
    pub fn context(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            bus: self.bus.clone(),
            origin: self.bus.allocate_origin(),
        }
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values().insert(key.to_string(), value.to_string());
        self.bus.publish(key, self.origin);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values().remove(key);
        self.bus.publish(key, self.origin);
        Ok(())
    }

    fn subscribe(&self) -> StorageSubscription {
        self.bus.subscribe(self.origin)
    }
}

/// Directory-backed store: one file per key.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    bus: StorageBus,
    origin: u64,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| StoreError::io("create", &root, err))?;
        let bus = StorageBus::new();
        let origin = bus.allocate_origin();
        debug!(root = %root.display(), "opened file store");
        Ok(Self { root, bus, origin })
    }

    /// Open another context on the same directory.
    #[must_use]
    pub fn context(&self) -> Self {
        Self {
            root: self.root.clone(),
            bus: self.bus.clone(),
            origin: self.bus.allocate_origin(),
        }
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io("read", path, err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        let staging = self.root.join(format!(".{key}.tmp"));
        fs::write(&staging, value).map_err(|err| StoreError::io("write", &staging, err))?;
        fs::rename(&staging, &path).map_err(|err| StoreError::io("write", &path, err))?;
        self.bus.publish(key, self.origin);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::io("remove", path, err)),
        }
        self.bus.publish(key, self.origin);
        Ok(())
    }

    fn subscribe(&self) -> StorageSubscription {
        self.bus.subscribe(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn memory_contexts_share_values() {
        let first = MemoryStore::new();
        let second = first.context();

        first.set("app-theme", "dark").expect("set");
        assert_eq!(second.get("app-theme").expect("get").as_deref(), Some("dark"));

        second.remove("app-theme").expect("remove");
        assert_eq!(first.get("app-theme").expect("get"), None);
    }

    #[tokio::test]
    async fn writes_notify_other_contexts_only() {
        let first = MemoryStore::new();
        let second = first.context();
        let mut first_events = first.subscribe();
        let mut second_events = second.subscribe();

        first.set("pokemon-notes", "{}").expect("set");

        let event = second_events.recv().await.expect("event");
        assert_eq!(event.key, "pokemon-notes");
        let own = tokio::time::timeout(Duration::from_millis(50), first_events.recv()).await;
        assert!(own.is_err(), "writer must not see its own event");
    }

    #[test]
    fn file_store_round_trips_and_tolerates_missing_keys() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::open(dir.path().join("state")).expect("open");

        assert_eq!(store.get("pokemon-favorites").expect("get"), None);
        store.set("pokemon-favorites", "[]").expect("set");
        assert_eq!(
            store.get("pokemon-favorites").expect("get").as_deref(),
            Some("[]")
        );
        assert!(store.root().join("pokemon-favorites").exists());
        assert!(!store.root().join(".pokemon-favorites.tmp").exists());

        store.remove("pokemon-favorites").expect("remove");
        store.remove("pokemon-favorites").expect("second remove");
        assert_eq!(store.get("pokemon-favorites").expect("get"), None);
    }

    #[test]
    fn file_store_reports_unreadable_paths() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("open");
        fs::create_dir(dir.path().join("app-theme")).expect("mkdir");

        let err = store.get("app-theme").expect_err("directory is not a value");
        assert!(matches!(err, StoreError::Io { operation: "read", .. }));
    }
}
