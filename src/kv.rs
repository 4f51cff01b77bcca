use crate::error::{KeepsakeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;
use tracing::debug;

/// Local key-value store holding the queue snapshot.
///
/// Mirrors the platform storage the app runs against: `get` returns the
/// last durably committed value for a key, `set` replaces it whole.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if the key was never written
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Durably replace the value under `key`
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// File-backed key-value store: one file per key under a private directory.
///
/// Writes go through a temp file followed by a rename so a crash mid-write
/// leaves the previous snapshot intact rather than a torn one.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeepsakeError::component(
                "kv_store",
                &format!("Failed to read key '{}': {}", key, e),
            )),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            KeepsakeError::component(
                "kv_store",
                &format!("Failed to create store directory: {}", e),
            )
        })?;

        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{}.tmp", key));

        fs::write(&tmp_path, value).await.map_err(|e| {
            KeepsakeError::component("kv_store", &format!("Failed to write key '{}': {}", key, e))
        })?;

        fs::rename(&tmp_path, &final_path).await.map_err(|e| {
            KeepsakeError::component(
                "kv_store",
                &format!("Failed to commit key '{}': {}", key, e),
            )
        })?;

        debug!("Committed {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}

/// In-memory key-value store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
