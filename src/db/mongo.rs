//! MongoDB record store
//!
//! Thin pass-through to the driver's native collection operations. Documents
//! use the `_id`/camelCase field layout, so collections written by earlier
//! Node deployments can be served without migration.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{DatabaseType, RecordStore};
use crate::models::{MediaRecord, MediaType, MediaUpdate, NewMedia};

const COLLECTION_NAME: &str = "media";
const APP_NAME: &str = "media-catalog";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    filename: String,
    filepath: String,
    #[serde(rename = "type")]
    media_type: MediaType,
    #[serde(default)]
    likes: i64,
    created_at: bson::DateTime,
}

impl From<MediaDocument> for MediaRecord {
    fn from(doc: MediaDocument) -> Self {
        let created_at = DateTime::<Utc>::from_timestamp_millis(doc.created_at.timestamp_millis())
            .unwrap_or_default();
        Self {
            id: doc.id.to_hex(),
            filename: doc.filename,
            filepath: doc.filepath,
            media_type: doc.media_type,
            likes: doc.likes,
            created_at,
        }
    }
}

pub struct MongoStore {
    collection: Collection<MediaDocument>,
}

impl MongoStore {
    /// Connect and verify the server answers a `ping` within `timeout`.
    ///
    /// The database name comes from the URI path when present, otherwise
    /// `default_database` is used.
    pub async fn connect(uri: &str, default_database: &str, timeout: Duration) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .with_context(|| "Invalid MongoDB connection string")?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(default_database));

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| anyhow!("MongoDB ping failed: {}", e))?;

        info!("Connected to MongoDB database '{}'", database.name());
        Ok(Self {
            collection: database.collection(COLLECTION_NAME),
        })
    }

    fn parse_id(id: &str) -> Option<ObjectId> {
        ObjectId::parse_str(id).ok()
    }

    fn update_document(update: &MediaUpdate) -> Document {
        match update {
            MediaUpdate::IncrementLikes(delta) => doc! { "$inc": { "likes": *delta } },
            MediaUpdate::Set(patch) => {
                let mut set = Document::new();
                if let Some(filename) = &patch.filename {
                    set.insert("filename", filename.clone());
                }
                if let Some(likes) = patch.likes {
                    set.insert("likes", likes);
                }
                doc! { "$set": set }
            }
        }
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MongoDb
    }

    fn is_valid_id(&self, id: &str) -> bool {
        id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
    }

    async fn initialize(&self) -> Result<()> {
        let index = IndexModel::builder().keys(doc! { "createdAt": -1 }).build();
        self.collection
            .create_index(index)
            .await
            .context("Failed to create createdAt index")?;
        Ok(())
    }

    async fn find(&self) -> Result<Vec<MediaRecord>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;
        let documents: Vec<MediaDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(MediaRecord::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MediaRecord>> {
        let Some(oid) = Self::parse_id(id) else {
            return Ok(None);
        };
        let document = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(document.map(MediaRecord::from))
    }

    async fn create(&self, media: NewMedia) -> Result<MediaRecord> {
        let document = MediaDocument {
            id: ObjectId::new(),
            filename: media.filename,
            filepath: media.filepath,
            media_type: media.media_type,
            likes: media.likes,
            created_at: bson::DateTime::now(),
        };
        self.collection.insert_one(&document).await?;

        debug!("Inserted media document {}", document.id);
        Ok(document.into())
    }

    async fn update_by_id(&self, id: &str, update: MediaUpdate) -> Result<Option<MediaRecord>> {
        let Some(oid) = Self::parse_id(id) else {
            return Ok(None);
        };
        let document = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, Self::update_document(&update))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(document.map(MediaRecord::from))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<MediaRecord>> {
        let Some(oid) = Self::parse_id(id) else {
            return Ok(None);
        };
        let document = self.collection.find_one_and_delete(doc! { "_id": oid }).await?;
        Ok(document.map(MediaRecord::from))
    }
}
