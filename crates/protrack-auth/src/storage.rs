//! Storage backends for persisted client state.
//!
//! The token store writes through a [`StorageBackend`] trait object so the
//! persistence medium can be substituted: a JSON file in production, an
//! in-memory map in tests, and a null backend for environments where no
//! medium exists at all (the server-side rendering case).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// A best-effort key/value persistence medium.
///
/// All operations are infallible from the caller's point of view: backends
/// log and swallow I/O failures rather than surfacing them, matching the
/// semantics of browser-local storage.
pub trait StorageBackend: Send + Sync {
    /// Store a value under a key, overwriting any previous value.
    fn set(&self, key: &str, value: &str);

    /// Retrieve the value for a key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Whether a persistence medium is actually available.
    ///
    /// When this returns `false`, writes are expected to be no-ops and
    /// reads to return `None`.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// File-backed storage: a flat JSON object persisted on every write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) file-backed storage at the given path.
    ///
    /// An unreadable or malformed file starts the store empty rather than
    /// failing; the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path).unwrap_or_default();
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Option<HashMap<String, String>> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(map) => Some(map),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed storage file");
                None
            }
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to create storage directory");
                return;
            }
        }

        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize storage");
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write storage file");
        }
    }
}

impl StorageBackend for FileStorage {
    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

/// Backend for environments without a persistence medium.
///
/// Every write is a no-op and every read returns `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorage;

impl StorageBackend for NullStorage {
    fn set(&self, _key: &str, _value: &str) {}

    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn remove(&self, _key: &str) {}

    fn is_available(&self) -> bool {
        false
    }
}
