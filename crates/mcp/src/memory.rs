//! Persistent key/value note store.
//!
//! Notes live in `<root>/.golens/memories.json` so they travel with the
//! indexed codebase. Every operation loads, mutates and rewrites the file
//! under an internal lock; this store manages its own exclusion and is
//! independent of the snapshot's concurrency contract.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("memory {0:?} not found")]
    NotFound(String),
}

pub struct MemoryStore {
    root: PathBuf,
    lock: RwLock<()>,
}

impl MemoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: RwLock::new(()),
        }
    }

    fn path(&self) -> PathBuf {
        self.root.join(".golens").join("memories.json")
    }

    fn load(&self) -> Result<BTreeMap<String, String>, MemoryError> {
        match fs::read(self.path()) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, memories: &BTreeMap<String, String>) -> Result<(), MemoryError> {
        let path = self.path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
            restrict_permissions(dir, 0o750);
        }
        let data = serde_json::to_vec_pretty(memories)?;
        fs::write(&path, data)?;
        restrict_permissions(&path, 0o600);
        Ok(())
    }

    pub fn write(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut memories = self.load()?;
        memories.insert(key.to_string(), value.to_string());
        self.save(&memories)
    }

    pub fn read(&self, key: &str) -> Result<String, MemoryError> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        let memories = self.load()?;
        memories
            .get(key)
            .cloned()
            .ok_or_else(|| MemoryError::NotFound(key.to_string()))
    }

    pub fn entries(&self) -> Result<BTreeMap<String, String>, MemoryError> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    pub fn delete(&self, key: &str) -> Result<(), MemoryError> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut memories = self.load()?;
        if memories.remove(key).is_none() {
            return Err(MemoryError::NotFound(key.to_string()));
        }
        self.save(&memories)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) {}
