//! Flat JSON file record store
//!
//! The whole collection lives in one file shaped `{ "media": [...] }`. Every
//! operation reads the file, mutates the parsed list and writes the whole
//! file back. Nothing is cached between calls, so edits made to the file by
//! hand are picked up immediately.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{DatabaseType, RecordStore};
use crate::models::{MediaRecord, MediaUpdate, NewMedia};

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalDatabase {
    #[serde(default)]
    media: Vec<MediaRecord>,
}

/// Record store backed by a single JSON file on disk
pub struct JsonFileStore {
    db_path: PathBuf,
    // Serializes read-modify-write cycles within this process. Other
    // processes writing the same file can still lose updates.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn read_db(&self) -> Result<LocalDatabase> {
        let raw = fs::read(&self.db_path)
            .await
            .with_context(|| format!("Failed to read local database {}", self.db_path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("Local database {} is not valid JSON", self.db_path.display()))
    }

    async fn write_db(&self, db: &LocalDatabase) -> Result<()> {
        let raw = serde_json::to_vec_pretty(db)?;
        fs::write(&self.db_path, raw)
            .await
            .with_context(|| format!("Failed to write local database {}", self.db_path.display()))
    }

    fn generate_id(existing: &[MediaRecord]) -> String {
        loop {
            let id = format!("{}{}", Utc::now().timestamp_millis(), random_base36(ID_SUFFIX_LEN));
            if !existing.iter().any(|record| record.id == id) {
                return id;
            }
        }
    }
}

/// Random lowercase base-36 string of `len` characters
fn random_base36(len: usize) -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Local
    }

    fn is_valid_id(&self, id: &str) -> bool {
        !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
    }

    async fn initialize(&self) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create local database directory {}", parent.display())
                })?;
            }
        }

        if !fs::try_exists(&self.db_path).await? {
            self.write_db(&LocalDatabase::default()).await?;
            info!("Created empty local database at {}", self.db_path.display());
        }

        Ok(())
    }

    async fn find(&self) -> Result<Vec<MediaRecord>> {
        let _guard = self.lock.lock().await;
        let mut media = self.read_db().await?.media;
        // Stable sort over the reversed list keeps later inserts first on ties
        media.reverse();
        media.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(media)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MediaRecord>> {
        let _guard = self.lock.lock().await;
        let db = self.read_db().await?;
        Ok(db.media.into_iter().find(|record| record.id == id))
    }

    async fn create(&self, media: NewMedia) -> Result<MediaRecord> {
        let _guard = self.lock.lock().await;
        let mut db = self.read_db().await?;

        let record = MediaRecord {
            id: Self::generate_id(&db.media),
            filename: media.filename,
            filepath: media.filepath,
            media_type: media.media_type,
            likes: media.likes,
            created_at: Utc::now(),
        };
        db.media.push(record.clone());
        self.write_db(&db).await?;

        debug!("Created local media record {}", record.id);
        Ok(record)
    }

    async fn update_by_id(&self, id: &str, update: MediaUpdate) -> Result<Option<MediaRecord>> {
        let _guard = self.lock.lock().await;
        let mut db = self.read_db().await?;

        let Some(record) = db.media.iter_mut().find(|record| record.id == id) else {
            return Ok(None);
        };
        update.apply_to(record);
        let updated = record.clone();

        self.write_db(&db).await?;
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<MediaRecord>> {
        let _guard = self.lock.lock().await;
        let mut db = self.read_db().await?;

        let Some(index) = db.media.iter().position(|record| record.id == id) else {
            return Ok(None);
        };
        let removed = db.media.remove(index);

        self.write_db(&db).await?;
        debug!("Deleted local media record {}", removed.id);
        Ok(Some(removed))
    }
}
