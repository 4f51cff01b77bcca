use crate::error::{KeepsakeError, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::{debug, info, warn};

/// Extensions preserved when staging media; anything else falls back to jpg
const KNOWN_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "mp4", "mov", "m4v",
];

/// Durable local media store.
///
/// Copies ephemeral source media (camera roll, capture session) into an
/// app-owned directory so the bytes survive until the sync engine has
/// uploaded them. Staged files are owned by exactly one queue item and are
/// deleted once that item's remote record exists.
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the staged files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy the file at `source` into the durable store.
    ///
    /// The destination name combines the current time, the ordinal index of
    /// the media within its memory, and a random suffix, so concurrent saves
    /// cannot collide. Fails if the copy cannot complete; callers must not
    /// enqueue an item referencing a path that failed to save.
    pub async fn save_locally(&self, source: &Path, index: usize) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            KeepsakeError::component(
                "media_store",
                &format!("Failed to create media directory: {}", e),
            )
        })?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let suffix = &uuid[..8];
        let filename = format!(
            "{}_{}_{}.{}",
            millis,
            index,
            suffix,
            infer_extension(source)
        );
        let dest = self.dir.join(filename);

        fs::copy(source, &dest).await.map_err(|e| {
            KeepsakeError::component(
                "media_store",
                &format!(
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    dest.display(),
                    e
                ),
            )
        })?;

        debug!("Staged media locally: {}", dest.display());
        Ok(dest)
    }

    /// Best-effort delete of a staged file.
    ///
    /// Absence of the file is success. Other failures are logged and
    /// swallowed: once the remote record exists, a leftover local copy must
    /// never re-block queue progress. Returns whether the file was removed.
    pub async fn delete_local(&self, path: &Path) -> bool {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Deleted staged media: {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Failed to delete staged media {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Wipe the entire staging directory.
    ///
    /// Only for the explicit "discard all pending" user action; the normal
    /// sync flow deletes files one by one.
    pub async fn clear_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                info!("Cleared staged media directory: {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KeepsakeError::component(
                "media_store",
                &format!("Failed to clear media directory: {}", e),
            )),
        }
    }
}

/// Infer a file extension from the source path, defaulting to jpg
fn infer_extension(source: &Path) -> String {
    source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| KNOWN_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or_else(|| "jpg".to_string())
}
