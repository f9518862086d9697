//! Record store abstraction for media metadata
//!
//! Two interchangeable backends implement [`RecordStore`]: a MongoDB
//! collection and a flat JSON file. Which one is used is decided once at
//! startup by [`factory::select_record_store`].

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{MediaRecord, MediaUpdate, NewMedia};

pub mod factory;
pub mod local;
#[cfg(feature = "mongo")]
pub mod mongo;

/// Which backend is serving record operations for this process.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, ToSchema)]
pub enum DatabaseType {
    #[serde(rename = "mongodb")]
    MongoDb,
    #[serde(rename = "local")]
    Local,
}

impl DatabaseType {
    pub fn description(&self) -> &'static str {
        match self {
            DatabaseType::MongoDb => "Using MongoDB database",
            DatabaseType::Local => "Using local JSON file database (MongoDB fallback)",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::MongoDb => write!(f, "mongodb"),
            DatabaseType::Local => write!(f, "local"),
        }
    }
}

/// Document-store style query surface over the single `media` collection
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend identifier reported by the status endpoint
    fn database_type(&self) -> DatabaseType;

    /// Whether `id` has the shape this backend generates.
    /// Callers check this before any by-id operation.
    fn is_valid_id(&self, id: &str) -> bool;

    /// Prepare the backend (create files, indexes, etc.). Must be idempotent.
    async fn initialize(&self) -> Result<()>;

    /// All records, newest first by `createdAt`
    async fn find(&self) -> Result<Vec<MediaRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<MediaRecord>>;

    /// Persist a new record, assigning its id and creation timestamp
    async fn create(&self, media: NewMedia) -> Result<MediaRecord>;

    /// Apply `update` and return the record as it is after the update
    async fn update_by_id(&self, id: &str, update: MediaUpdate) -> Result<Option<MediaRecord>>;

    /// Remove the record and return it as it was before removal
    async fn delete_by_id(&self, id: &str) -> Result<Option<MediaRecord>>;
}
