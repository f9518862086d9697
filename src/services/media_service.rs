/*!
 * Media Service
 *
 * Orchestrates upload validation, record persistence through the active
 * record store, and the file-system side effects that go with them.
 */

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::{DatabaseType, RecordStore};
use crate::errors::MediaError;
use crate::models::{
    DatabaseStatus, MediaListResponse, MediaPatch, MediaRecord, MediaType, MediaUpdate,
    MediaView, MessageResponse, NewMedia,
};
use crate::storage::{LocalUploadStorage, MAX_UPLOAD_BYTES};

/// An upload that has already been written to the uploads directory
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    pub original_name: String,
    pub content_type: String,
    /// Server-relative path of the written file
    pub filepath: String,
    /// Bytes received; may exceed what was written when the upload was cut off
    pub size: u64,
}

/// A record together with the on-disk location of its file
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub record: MediaRecord,
    pub path: PathBuf,
}

pub struct MediaService {
    store: Arc<dyn RecordStore>,
    storage: Arc<LocalUploadStorage>,
}

impl MediaService {
    pub fn new(store: Arc<dyn RecordStore>, storage: Arc<LocalUploadStorage>) -> Self {
        Self { store, storage }
    }

    pub fn storage(&self) -> &Arc<LocalUploadStorage> {
        &self.storage
    }

    pub fn database_type(&self) -> DatabaseType {
        self.store.database_type()
    }

    pub fn status(&self) -> DatabaseStatus {
        let database_type = self.store.database_type();
        DatabaseStatus {
            database_type,
            status: "connected".to_string(),
            description: Some(database_type.description().to_string()),
        }
    }

    /// Validate and catalog an uploaded file.
    ///
    /// Every rejection after the file hit the disk removes it again.
    pub async fn upload(&self, upload: Option<IncomingUpload>) -> Result<MediaRecord, MediaError> {
        let upload = upload.ok_or_else(|| MediaError::invalid_input("No file uploaded"))?;

        if upload.size > MAX_UPLOAD_BYTES {
            warn!(
                "Rejecting upload '{}' of {} bytes (limit {} bytes)",
                upload.original_name, upload.size, MAX_UPLOAD_BYTES
            );
            self.storage.remove_file(&upload.filepath).await;
            return Err(MediaError::invalid_input(format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let Some(media_type) = MediaType::from_content_type(&upload.content_type) else {
            warn!(
                "Rejecting upload '{}' with content type '{}'",
                upload.original_name, upload.content_type
            );
            self.storage.remove_file(&upload.filepath).await;
            return Err(MediaError::invalid_input("Only image and video files are allowed"));
        };

        let new_media = NewMedia::new(&upload.original_name, &upload.filepath, media_type);
        match self.store.create(new_media).await {
            Ok(record) => {
                info!("Uploaded {} '{}' as {}", record.media_type, record.filename, record.id);
                Ok(record)
            }
            Err(e) => {
                error!("Failed to save media record for '{}': {:#}", upload.original_name, e);
                self.storage.remove_file(&upload.filepath).await;
                Err(MediaError::persistence("Upload failed", e))
            }
        }
    }

    /// All records, newest first, decorated for display
    pub async fn list(&self, base_url: &str) -> Result<MediaListResponse, MediaError> {
        let records = self
            .store
            .find()
            .await
            .map_err(|e| MediaError::persistence("Server error", e))?;

        let mut media = Vec::with_capacity(records.len());
        for record in records {
            let file_exists = self.storage.file_exists(&record.filepath).await;
            media.push(MediaView::new(record, base_url, file_exists));
        }

        Ok(MediaListResponse {
            total: media.len(),
            media,
        })
    }

    /// Locate a record and its file for streaming
    pub async fn get_by_id(&self, id: &str) -> Result<MediaFile, MediaError> {
        self.validate_id(id)?;

        let record = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| MediaError::persistence("Server error", e))?
            .ok_or_else(|| MediaError::not_found("Media not found"))?;

        if !self.storage.file_exists(&record.filepath).await {
            warn!("Media {} exists but its file {} is missing", record.id, record.filepath);
            return Err(MediaError::not_found("Media file not found on disk"));
        }

        let path = self.storage.resolve_file_path(&record.filepath);
        Ok(MediaFile { record, path })
    }

    pub async fn like(&self, id: &str) -> Result<MediaRecord, MediaError> {
        self.validate_id(id)?;
        self.increment_likes(id, 1).await
    }

    /// Decrement likes, clamping the stored value back to zero if it went negative
    pub async fn unlike(&self, id: &str) -> Result<MediaRecord, MediaError> {
        self.validate_id(id)?;
        let record = self.increment_likes(id, -1).await?;
        if record.likes >= 0 {
            return Ok(record);
        }

        let clamp = MediaUpdate::Set(MediaPatch {
            likes: Some(0),
            ..Default::default()
        });
        self.store
            .update_by_id(id, clamp)
            .await
            .map_err(|e| MediaError::persistence("Server error", e))?
            .ok_or_else(|| MediaError::not_found("Media not found"))
    }

    /// Remove the record, then best-effort remove its file.
    ///
    /// The deletion succeeds even when the file cannot be removed.
    pub async fn delete(&self, id: &str) -> Result<MessageResponse, MediaError> {
        self.validate_id(id)?;

        let record = self
            .store
            .delete_by_id(id)
            .await
            .map_err(|e| MediaError::persistence("Server error", e))?
            .ok_or_else(|| MediaError::not_found("Media not found"))?;

        if !self.storage.remove_file(&record.filepath).await {
            warn!("Media {} deleted but its file {} was not removed", record.id, record.filepath);
        }

        Ok(MessageResponse::new("Deleted successfully"))
    }

    async fn increment_likes(&self, id: &str, delta: i64) -> Result<MediaRecord, MediaError> {
        self.store
            .update_by_id(id, MediaUpdate::IncrementLikes(delta))
            .await
            .map_err(|e| MediaError::persistence("Server error", e))?
            .ok_or_else(|| MediaError::not_found("Media not found"))
    }

    fn validate_id(&self, id: &str) -> Result<(), MediaError> {
        if self.store.is_valid_id(id) {
            Ok(())
        } else {
            Err(MediaError::invalid_input("Invalid media ID format"))
        }
    }
}
