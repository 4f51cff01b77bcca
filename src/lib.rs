pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod kv;
pub mod media_store;
pub mod model;
pub mod queue;
pub mod remote;
pub mod sync_integration;

pub use config::{KeepsakeConfig, StorageConfig, SyncConfig};
pub use connectivity::{ConnectivityMonitor, ConnectivitySignal};
pub use engine::SyncEngine;
pub use error::{KeepsakeError, Result};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use media_store::MediaStore;
pub use model::{
    DrainReport, MediaRef, MediaSource, MediaType, NewMemory, QueueItem, RemoteMediaAsset,
    RemoteRecord,
};
pub use queue::QueueStore;
pub use remote::{DocumentStore, ObjectStore, ThumbnailGenerator};
pub use sync_integration::{SyncIntegration, SyncIntegrationBuilder, SyncIntegrationStats};
