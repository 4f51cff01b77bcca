use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KeepsakeConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// App-private directory for durably staged media files
    #[serde(default = "default_media_dir")]
    pub media_dir: String,

    /// Directory backing the local key-value store
    #[serde(default = "default_queue_dir")]
    pub queue_dir: String,

    /// Well-known key holding the serialized queue snapshot
    #[serde(default = "default_queue_key")]
    pub queue_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Remote document collection receiving finished memory records
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Per-call timeout for remote uploads and document writes
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Derive and upload thumbnails for video assets
    #[serde(default = "default_video_thumbnails")]
    pub video_thumbnails: bool,
}

impl KeepsakeConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("keepsake.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("storage.media_dir", default_media_dir())?
            .set_default("storage.queue_dir", default_queue_dir())?
            .set_default("storage.queue_key", default_queue_key())?
            .set_default("sync.collection", default_collection())?
            .set_default("sync.call_timeout_secs", default_call_timeout_secs())?
            .set_default("sync.video_thumbnails", default_video_thumbnails())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with KEEPSAKE_ prefix
            .add_source(Environment::with_prefix("KEEPSAKE").separator("_"))
            .build()?;

        let config: KeepsakeConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.media_dir.is_empty() {
            return Err(ConfigError::Message(
                "Storage media_dir must not be empty".to_string(),
            ));
        }

        if self.storage.queue_dir.is_empty() {
            return Err(ConfigError::Message(
                "Storage queue_dir must not be empty".to_string(),
            ));
        }

        if self.storage.queue_key.is_empty() {
            return Err(ConfigError::Message(
                "Storage queue_key must not be empty".to_string(),
            ));
        }

        if self.sync.collection.is_empty() {
            return Err(ConfigError::Message(
                "Sync collection must not be empty".to_string(),
            ));
        }

        if self.sync.call_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Sync call_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for KeepsakeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                media_dir: default_media_dir(),
                queue_dir: default_queue_dir(),
                queue_key: default_queue_key(),
            },
            sync: SyncConfig {
                collection: default_collection(),
                call_timeout_secs: default_call_timeout_secs(),
                video_thumbnails: default_video_thumbnails(),
            },
        }
    }
}

// Default value functions
fn default_media_dir() -> String {
    "offline_memories".to_string()
}

fn default_queue_dir() -> String {
    "queue".to_string()
}

fn default_queue_key() -> String {
    "memories_offline_queue".to_string()
}

fn default_collection() -> String {
    "memories".to_string()
}

fn default_call_timeout_secs() -> u64 {
    60
}

fn default_video_thumbnails() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = KeepsakeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.queue_key, "memories_offline_queue");
        assert_eq!(config.sync.collection, "memories");
        assert_eq!(config.sync.call_timeout_secs, 60);
        assert!(config.sync.video_thumbnails);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let config = KeepsakeConfig::load_from_file("/nonexistent/keepsake.toml").unwrap();
        assert_eq!(config.storage.media_dir, "offline_memories");
        assert_eq!(config.storage.queue_dir, "queue");
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keepsake.toml");
        std::fs::write(
            &path,
            r#"
[storage]
media_dir = "/data/memories"

[sync]
call_timeout_secs = 10
video_thumbnails = false
"#,
        )
        .unwrap();

        let config = KeepsakeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.storage.media_dir, "/data/memories");
        assert_eq!(config.sync.call_timeout_secs, 10);
        assert!(!config.sync.video_thumbnails);
        // Untouched sections keep their defaults
        assert_eq!(config.storage.queue_key, "memories_offline_queue");
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = KeepsakeConfig::default();
        config.sync.call_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_paths() {
        let mut config = KeepsakeConfig::default();
        config.storage.media_dir = String::new();
        assert!(config.validate().is_err());

        let mut config = KeepsakeConfig::default();
        config.storage.queue_key = String::new();
        assert!(config.validate().is_err());
    }
}
