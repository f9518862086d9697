pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod swagger;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;


use anyhow::Result;
use std::sync::Arc;

use config::Config;
use db::RecordStore;
use services::MediaService;
use storage::LocalUploadStorage;

pub struct AppState {
    pub config: Config,
    pub media_service: Arc<MediaService>,
}

impl AppState {
    /// Wire the services around an already selected record store
    pub async fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Result<Self> {
        let storage = Arc::new(LocalUploadStorage::new(&config.upload_path));
        storage.initialize().await?;

        Ok(Self {
            media_service: Arc::new(MediaService::new(store, storage)),
            config,
        })
    }

    /// Select the record store backend and wire the services
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = db::factory::select_record_store(&config).await?;
        Self::with_store(config, store).await
    }
}
