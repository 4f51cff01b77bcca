use crate::error::Result;
use crate::model::RemoteRecord;
use async_trait::async_trait;
use std::path::Path;

/// Path-addressed remote blob storage for photos, videos, and thumbnails
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` at `path`, returning the asset's download URL.
    /// Re-putting an existing path replaces its content.
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Append-only remote document database holding finalized memory records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create one record in `collection`, returning its document id
    async fn create(&self, collection: &str, record: &RemoteRecord) -> Result<String>;
}

/// Derives a still thumbnail (JPEG bytes) from a local video file
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    async fn derive(&self, video: &Path) -> Result<Vec<u8>>;
}

/// Remote object path for one media asset.
///
/// Deterministic per (child, item, index): a retry after a failed pass
/// re-puts the same path instead of orphaning blobs under fresh names.
pub fn asset_path(child_id: &str, item_id: &str, index: usize, local_path: &Path) -> String {
    let extension = local_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    format!("memories/{}/{}/{}.{}", child_id, item_id, index, extension)
}

/// Remote object path for the thumbnail of a video asset
pub fn thumbnail_path(child_id: &str, item_id: &str, index: usize) -> String {
    format!("memories/{}/{}/{}_thumb.jpg", child_id, item_id, index)
}
