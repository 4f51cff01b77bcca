use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of a media asset attached to a memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

/// A staged media file owned by exactly one queue item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub local_path: PathBuf,
    pub media_type: MediaType,
}

/// An ephemeral media source (camera roll / capture) before staging.
/// The OS may evict the file behind `uri` at any time, which is why it is
/// copied into the durable store before the memory is enqueued.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub uri: PathBuf,
    pub media_type: MediaType,
}

/// A memory as captured by the UI, not yet staged or enqueued
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub child_id: String,
    pub author_id: String,
    pub media: Vec<MediaSource>,
    pub caption: String,
    pub description: String,
    pub memory_date: DateTime<Utc>,
}

/// One pending memory awaiting upload.
///
/// The only persisted lifecycle state is presence in the queue snapshot:
/// present means pending, absent means done. An item is removed only after
/// its remote record has been durably created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    pub child_id: String,
    pub author_id: String,
    pub media: Vec<MediaRef>,
    pub caption: String,
    pub description: String,
    pub memory_date: DateTime<Utc>,
    pub enqueued_at: DateTime<Utc>,
}

/// An uploaded media asset as it appears inside a remote record.
/// Exists only after a successful upload; never persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMediaAsset {
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub media_type: MediaType,
    pub order: u32,
}

/// The finalized, queryable representation of one synced memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub child_id: String,
    pub author_id: String,
    pub media: Vec<RemoteMediaAsset>,
    pub caption: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes: u64,
    pub liked_by: Vec<String>,
}

impl RemoteRecord {
    /// Build the record for a queue item once all of its assets are uploaded
    pub fn from_item(item: &QueueItem, media: Vec<RemoteMediaAsset>) -> Self {
        let now = Utc::now();
        Self {
            child_id: item.child_id.clone(),
            author_id: item.author_id.clone(),
            media,
            caption: item.caption.clone(),
            description: item.description.clone(),
            date: item.memory_date,
            created_at: now,
            updated_at: now,
            likes: 0,
            liked_by: Vec::new(),
        }
    }
}

/// Summary of one drain pass. Telemetry for the UI only; correctness is
/// defined entirely by queue and remote state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub processed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaType::Photo).unwrap(), "\"photo\"");
        assert_eq!(serde_json::to_string(&MediaType::Video).unwrap(), "\"video\"");

        let parsed: MediaType = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(parsed, MediaType::Video);
    }

    #[test]
    fn remote_record_from_item_carries_memory_fields() {
        let item = QueueItem {
            id: "1700000000000".to_string(),
            child_id: "c1".to_string(),
            author_id: "u1".to_string(),
            media: vec![],
            caption: "first steps".to_string(),
            description: "in the garden".to_string(),
            memory_date: Utc::now(),
            enqueued_at: Utc::now(),
        };

        let record = RemoteRecord::from_item(&item, vec![]);
        assert_eq!(record.child_id, "c1");
        assert_eq!(record.author_id, "u1");
        assert_eq!(record.caption, "first steps");
        assert_eq!(record.date, item.memory_date);
        assert_eq!(record.likes, 0);
        assert!(record.liked_by.is_empty());
    }

    #[test]
    fn queue_item_survives_snapshot_round_trip() {
        let item = QueueItem {
            id: "42".to_string(),
            child_id: "c1".to_string(),
            author_id: "u1".to_string(),
            media: vec![MediaRef {
                local_path: PathBuf::from("/data/offline_memories/a.jpg"),
                media_type: MediaType::Photo,
            }],
            caption: "beach day".to_string(),
            description: String::new(),
            memory_date: Utc::now(),
            enqueued_at: Utc::now(),
        };

        let bytes = serde_json::to_vec(&vec![item.clone()]).unwrap();
        let parsed: Vec<QueueItem> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "42");
        assert_eq!(parsed[0].media[0].media_type, MediaType::Photo);
    }
}
