use crate::config::SyncConfig;
use crate::error::{KeepsakeError, Result};
use crate::media_store::MediaStore;
use crate::model::{
    DrainReport, MediaRef, MediaType, NewMemory, QueueItem, RemoteMediaAsset, RemoteRecord,
};
use crate::queue::QueueStore;
use crate::remote::{asset_path, thumbnail_path, DocumentStore, ObjectStore, ThumbnailGenerator};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Drains the offline queue: uploads each pending memory's media, writes its
/// remote record, deletes the staged local files, and removes the item.
///
/// An item is removed from the queue only after its remote record has been
/// created; any fatal failure before that point leaves the item untouched,
/// so a crash mid-upload is indistinguishable from "never started" and the
/// item is simply retried in full on the next pass.
pub struct SyncEngine {
    queue: Arc<QueueStore>,
    media: Arc<MediaStore>,
    objects: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
    thumbnails: Arc<dyn ThumbnailGenerator>,
    config: SyncConfig,
    drain_guard: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        queue: Arc<QueueStore>,
        media: Arc<MediaStore>,
        objects: Arc<dyn ObjectStore>,
        documents: Arc<dyn DocumentStore>,
        thumbnails: Arc<dyn ThumbnailGenerator>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            media,
            objects,
            documents,
            thumbnails,
            config,
            drain_guard: Mutex::new(()),
        }
    }

    /// Stage a freshly captured memory for later upload.
    ///
    /// Copies every source file into the durable media store, then enqueues
    /// one item referencing the staged copies. If any copy fails, the copies
    /// made so far are deleted and nothing is enqueued, so the queue never
    /// references a path that failed to save.
    pub async fn stage(&self, memory: NewMemory) -> Result<QueueItem> {
        let mut media = Vec::with_capacity(memory.media.len());

        for (index, source) in memory.media.iter().enumerate() {
            match self.media.save_locally(&source.uri, index).await {
                Ok(local_path) => media.push(MediaRef {
                    local_path,
                    media_type: source.media_type,
                }),
                Err(e) => {
                    for staged in &media {
                        self.media.delete_local(&staged.local_path).await;
                    }
                    return Err(e);
                }
            }
        }

        let mut item = QueueItem {
            id: String::new(),
            child_id: memory.child_id,
            author_id: memory.author_id,
            media,
            caption: memory.caption,
            description: memory.description,
            memory_date: memory.memory_date,
            enqueued_at: Utc::now(),
        };
        item.id = self.queue.enqueue(item.clone()).await?;

        info!(
            "Staged memory {} for child {} ({} media files)",
            item.id,
            item.child_id,
            item.media.len()
        );
        Ok(item)
    }

    /// Process every currently queued item, in FIFO order, one at a time.
    ///
    /// Single-flight: a second trigger arriving while a drain is running
    /// returns an empty report immediately instead of starting a concurrent
    /// pass. A failing item stays queued and counts as failed; later items
    /// are still attempted (skip-and-continue).
    pub async fn drain(&self) -> DrainReport {
        let _guard = match self.drain_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Drain already in flight; skipping trigger");
                return DrainReport::default();
            }
        };

        let items = self.queue.list().await;
        if items.is_empty() {
            return DrainReport::default();
        }

        info!("Draining offline queue: {} pending item(s)", items.len());
        let mut report = DrainReport::default();

        for item in &items {
            match self.process_item(item).await {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    warn!("Memory {} stays queued for retry: {}", item.id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Drain finished: {} processed, {} failed",
            report.processed, report.failed
        );
        report
    }

    /// Discard every pending memory and wipe the staged media directory.
    /// Only for an explicit user action; never part of the sync flow.
    pub async fn discard_all(&self) -> Result<()> {
        self.queue.clear().await?;
        self.media.clear_all().await?;
        info!("Discarded all pending memories");
        Ok(())
    }

    async fn process_item(&self, item: &QueueItem) -> Result<()> {
        let mut assets = Vec::with_capacity(item.media.len());

        for (index, media) in item.media.iter().enumerate() {
            let bytes = tokio::fs::read(&media.local_path).await.map_err(|e| {
                KeepsakeError::component(
                    "sync_engine",
                    &format!(
                        "Failed to read staged file {}: {}",
                        media.local_path.display(),
                        e
                    ),
                )
            })?;

            let path = asset_path(&item.child_id, &item.id, index, &media.local_path);
            let media_url = self.put_with_timeout(&path, bytes).await?;

            let thumbnail_url = if media.media_type == MediaType::Video {
                self.upload_video_thumbnail(item, index, &media.local_path)
                    .await
            } else {
                None
            };

            assets.push(RemoteMediaAsset {
                media_url,
                thumbnail_url,
                media_type: media.media_type,
                order: index as u32,
            });
        }

        let record = RemoteRecord::from_item(item, assets);
        let record_id = self
            .with_timeout(
                format!("Document create for memory {}", item.id),
                self.documents.create(&self.config.collection, &record),
            )
            .await?;
        debug!("Created remote record {} for memory {}", record_id, item.id);

        // The remote record is the source of truth from here on: local
        // cleanup failures are logged by the media store, never raised.
        for media in &item.media {
            self.media.delete_local(&media.local_path).await;
        }

        self.queue.remove(&item.id).await?;
        info!("Memory {} synced and removed from queue", item.id);
        Ok(())
    }

    /// Derive and upload a thumbnail for a video asset. Never fatal to the
    /// item: on any failure the asset just ships without a thumbnail.
    async fn upload_video_thumbnail(
        &self,
        item: &QueueItem,
        index: usize,
        video: &std::path::Path,
    ) -> Option<String> {
        if !self.config.video_thumbnails {
            return None;
        }

        let jpeg = match self.thumbnails.derive(video).await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(
                    "Thumbnail derivation failed for {} (memory {}): {}",
                    video.display(),
                    item.id,
                    e
                );
                return None;
            }
        };

        let path = thumbnail_path(&item.child_id, &item.id, index);
        match self.put_with_timeout(&path, jpeg).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Thumbnail upload failed for memory {}: {}", item.id, e);
                None
            }
        }
    }

    async fn put_with_timeout(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        self.with_timeout(
            format!("Upload of {}", path),
            self.objects.put(path, bytes),
        )
        .await
    }

    /// Wrap a remote call in the configured per-call timeout so a stuck
    /// call fails the item (retried later) instead of wedging the drain.
    async fn with_timeout<T>(
        &self,
        operation: String,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let seconds = self.config.call_timeout_secs;
        match timeout(Duration::from_secs(seconds), call).await {
            Ok(result) => result,
            Err(_) => Err(KeepsakeError::timeout(operation, seconds)),
        }
    }
}
