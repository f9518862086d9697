/*!
 * Test Helpers and Utilities
 *
 * Builders for test configurations, app state and routers backed by the
 * local JSON store inside a temporary directory, plus multipart request
 * construction for upload tests.
 */

use axum::{body::Body, http::Request, Router};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::{
    config::{BackendPreference, Config},
    db::{local::JsonFileStore, RecordStore},
    routes::build_router,
    AppState,
};

pub const TEST_BOUNDARY: &str = "----media-catalog-test-boundary";

/// Creates a test configuration rooted at `base_dir`
/// The local backend is forced so tests never try to reach MongoDB
pub fn create_test_config(base_dir: &Path) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        mongo_uri: "mongodb://127.0.0.1:27017/media_catalog_test".to_string(),
        mongo_database: "media_catalog_test".to_string(),
        mongo_connect_timeout_seconds: 1,
        database_backend: BackendPreference::Local,
        upload_path: base_dir.join("uploads").to_string_lossy().to_string(),
        local_db_path: base_dir.join("data").join("local-db.json").to_string_lossy().to_string(),
    }
}

/// Creates an initialized local JSON store at the configured path
pub async fn create_test_store(config: &Config) -> Arc<dyn RecordStore> {
    let store = JsonFileStore::new(&config.local_db_path);
    store
        .initialize()
        .await
        .expect("Failed to initialize test record store");
    Arc::new(store)
}

/// Creates a test AppState with a custom configuration
pub async fn create_test_app_state_with_config(config: Config) -> Arc<AppState> {
    let store = create_test_store(&config).await;
    Arc::new(
        AppState::with_store(config, store)
            .await
            .expect("Failed to create test app state"),
    )
}

/// Everything an integration test needs; the temp dir lives as long as the context
pub struct TestContext {
    pub app: Router,
    pub state: Arc<AppState>,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = create_test_config(temp_dir.path());
        let state = create_test_app_state_with_config(config).await;
        let app = build_router(state.clone());
        Self { app, state, temp_dir }
    }

    pub fn upload_dir(&self) -> &Path {
        self.state.media_service.storage().upload_path()
    }

    /// Number of files currently in the uploads directory
    pub fn uploaded_file_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir())
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }
}

/// Builds a multipart/form-data body with a single file part
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", TEST_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", TEST_BOUNDARY).as_bytes());
    body
}

/// POST request to the upload endpoint carrying one file
pub fn upload_request(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/media/upload")
        .header("host", "localhost:4000")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", TEST_BOUNDARY),
        )
        .body(Body::from(multipart_body("file", filename, content_type, data)))
        .expect("Failed to build upload request")
}
