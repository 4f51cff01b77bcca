use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::model::QueueItem;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Persisted FIFO of pending memories.
///
/// The whole queue lives as one JSON blob under one well-known key of the
/// local key-value store. Every mutation is a read-modify-write of the full
/// snapshot, serialized through an internal mutex so two rapid writers can
/// never blind-overwrite each other's append.
pub struct QueueStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
    last_id_millis: AtomicI64,
}

impl QueueStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            write_lock: Mutex::new(()),
            last_id_millis: AtomicI64::new(0),
        }
    }

    /// Current snapshot in enqueue order.
    ///
    /// A missing, unreadable, or corrupt snapshot yields an empty queue
    /// rather than an error; corruption is a genuine loss of pending user
    /// data, so it is logged loudly before the queue moves on.
    pub async fn list(&self) -> Vec<QueueItem> {
        let bytes = match self.kv.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Failed to read queue snapshot under '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(e) => {
                error!(
                    "Corrupt queue snapshot under '{}' ({} bytes) treated as empty; \
                     pending memories were lost: {}",
                    self.key,
                    bytes.len(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Number of pending items
    pub async fn count(&self) -> usize {
        self.list().await.len()
    }

    /// Append `item` to the end of the queue, assigning an id if it has
    /// none. Returns the item's id once the snapshot write has committed.
    pub async fn enqueue(&self, mut item: QueueItem) -> Result<String> {
        let _guard = self.write_lock.lock().await;

        if item.id.is_empty() {
            item.id = self.next_id();
        }
        let id = item.id.clone();

        let mut items = self.list().await;
        items.push(item);
        self.persist(&items).await?;

        info!("Enqueued memory {} ({} now pending)", id, items.len());
        Ok(id)
    }

    /// Remove the item with the given id. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.list().await;
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            debug!("Queue item {} already absent", id);
            return Ok(());
        }

        self.persist(&items).await?;
        debug!("Removed queue item {} ({} remaining)", id, items.len());
        Ok(())
    }

    /// Persist an empty snapshot, discarding every pending item
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&[]).await?;
        info!("Cleared queue snapshot under '{}'", self.key);
        Ok(())
    }

    async fn persist(&self, items: &[QueueItem]) -> Result<()> {
        let bytes = serde_json::to_vec(items)?;
        self.kv.set(&self.key, &bytes).await
    }

    /// Millisecond timestamp bumped through an atomic max so ids stay
    /// unique and monotonic even for enqueues within the same millisecond.
    fn next_id(&self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last_id_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_id_millis.compare_exchange(
                prev,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}
