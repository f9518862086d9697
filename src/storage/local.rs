//! Local filesystem storage for uploaded media files

use anyhow::{anyhow, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::PUBLIC_UPLOADS_PREFIX;

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A freshly created, still empty upload file
pub struct UploadTarget {
    pub file: fs::File,
    /// Server-relative path recorded on the media record, e.g. `/uploads/1712-cat.png`
    pub public_path: String,
}

/// Uploads directory on the local filesystem
pub struct LocalUploadStorage {
    upload_path: PathBuf,
}

impl LocalUploadStorage {
    pub fn new(upload_path: impl Into<PathBuf>) -> Self {
        Self { upload_path: upload_path.into() }
    }

    /// Get the base upload path
    pub fn upload_path(&self) -> &Path {
        &self.upload_path
    }

    /// Ensure the uploads directory exists
    pub async fn initialize(&self) -> Result<()> {
        if let Err(e) = fs::create_dir_all(&self.upload_path).await {
            error!("Failed to create upload directory {:?}: {}", self.upload_path, e);
            return Err(anyhow!("Failed to create upload directory: {}", e));
        }
        info!("Ensured upload directory exists: {:?}", self.upload_path);
        Ok(())
    }

    /// Name a stored file `<millis>-<original name>`.
    ///
    /// Only the final path component of the client name is kept so an
    /// upload can never land outside the uploads directory.
    pub fn stored_filename(original_name: &str) -> String {
        format!("{}-{}", Utc::now().timestamp_millis(), Self::base_name(original_name))
    }

    fn base_name(original_name: &str) -> &str {
        Path::new(original_name)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
    }

    /// Create the destination file for an incoming upload.
    ///
    /// Files are opened with `create_new` so an existing upload is never
    /// truncated. When `<millis>-<name>` is taken, `<millis>-<n>-<name>` is
    /// tried with increasing `n`.
    pub async fn create_upload(&self, original_name: &str) -> Result<UploadTarget> {
        fs::create_dir_all(&self.upload_path).await?;

        let millis = Utc::now().timestamp_millis();
        let base_name = Self::base_name(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let stored_name = if attempt == 0 {
                format!("{}-{}", millis, base_name)
            } else {
                format!("{}-{}-{}", millis, attempt, base_name)
            };

            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.upload_path.join(&stored_name))
                .await;

            match opened {
                Ok(file) => {
                    return Ok(UploadTarget {
                        file,
                        public_path: format!("{}{}", PUBLIC_UPLOADS_PREFIX, stored_name),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("Upload name {} already taken, retrying", stored_name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(anyhow!(
            "Could not find a free file name for '{}' after {} attempts",
            base_name,
            MAX_NAME_ATTEMPTS
        ))
    }

    /// Map a record's server-relative `filepath` to its location on disk
    pub fn resolve_file_path(&self, public_path: &str) -> PathBuf {
        let relative = public_path
            .strip_prefix(PUBLIC_UPLOADS_PREFIX)
            .or_else(|| public_path.strip_prefix(&PUBLIC_UPLOADS_PREFIX[1..]))
            .unwrap_or(public_path);
        let file_name = Path::new(relative)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        self.upload_path.join(file_name)
    }

    pub async fn file_exists(&self, public_path: &str) -> bool {
        let path = self.resolve_file_path(public_path);
        matches!(fs::metadata(&path).await, Ok(metadata) if metadata.is_file())
    }

    /// Best-effort removal of a stored file.
    ///
    /// Failures are logged and reported through the return value only;
    /// callers never fail because a file could not be removed.
    pub async fn remove_file(&self, public_path: &str) -> bool {
        let path = self.resolve_file_path(public_path);
        match fs::remove_file(&path).await {
            Ok(_) => {
                info!("Deleted file: {}", path.display());
                true
            }
            Err(e) => match e.kind() {
                std::io::ErrorKind::NotFound => {
                    info!("File already deleted: {}", path.display());
                    false
                }
                _ => {
                    warn!("Failed to delete file {}: {}", path.display(), e);
                    false
                }
            },
        }
    }
}
