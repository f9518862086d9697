//! Startup selection of the record store backend

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::local::JsonFileStore;
use super::RecordStore;
use crate::config::{BackendPreference, Config};

#[cfg(feature = "mongo")]
use super::mongo::MongoStore;

/// Pick the record store for this process.
///
/// The decision is made once; the returned store is used for the lifetime
/// of the process and MongoDB is never re-probed after a fallback.
pub async fn select_record_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    match config.database_backend {
        BackendPreference::Local => {
            info!("Local JSON database requested, skipping MongoDB");
            create_local_store(config).await
        }
        BackendPreference::MongoDb => create_mongo_store(config).await,
        BackendPreference::Auto => match create_mongo_store(config).await {
            Ok(store) => Ok(store),
            Err(e) => {
                error!("MongoDB connection failed: {:#}", e);
                warn!("Falling back to local JSON database");
                create_local_store(config).await
            }
        },
    }
}

async fn create_local_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    let store = JsonFileStore::new(&config.local_db_path);
    store
        .initialize()
        .await
        .context("Failed to initialize local database")?;
    info!("Local JSON database initialized at {}", store.db_path().display());
    Ok(Arc::new(store))
}

#[cfg(feature = "mongo")]
async fn create_mongo_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    let store = MongoStore::connect(
        &config.mongo_uri,
        &config.mongo_database,
        config.mongo_connect_timeout(),
    )
    .await?;
    store.initialize().await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo"))]
async fn create_mongo_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    // MongoDB requested but not compiled in
    warn!("MongoDB backend requested but the mongo feature is not compiled in, using local JSON database");
    create_local_store(config).await
}
