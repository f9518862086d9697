use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::media::MediaRecord;
use crate::db::DatabaseType;

/// A record decorated with URLs and on-disk state for the list endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaView {
    #[serde(flatten)]
    pub record: MediaRecord,
    /// Static URL of the stored file
    pub url: String,
    /// Streams the file inline
    pub view_url: String,
    /// Streams the file as an attachment
    pub download_url: String,
    pub file_exists: bool,
    pub is_image: bool,
    pub is_video: bool,
}

impl MediaView {
    pub fn new(record: MediaRecord, base_url: &str, file_exists: bool) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let view_url = format!("{}/api/media/{}", base_url, urlencoding::encode(&record.id));
        Self {
            url: format!("{}{}", base_url, encode_file_path(&record.filepath)),
            download_url: format!("{}?download=true", view_url),
            view_url,
            file_exists,
            is_image: record.is_image(),
            is_video: record.is_video(),
            record,
        }
    }
}

/// Percent-encode the file name segment of a server-relative path,
/// leaving the directory part (`/uploads/`) as is.
fn encode_file_path(filepath: &str) -> String {
    match filepath.rsplit_once('/') {
        Some((dir, name)) => format!("{}/{}", dir, urlencoding::encode(name)),
        None => urlencoding::encode(filepath).into_owned(),
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MediaListResponse {
    pub total: usize,
    pub media: Vec<MediaView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatabaseStatus {
    #[serde(rename = "type")]
    pub database_type: DatabaseType,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusResponse {
    pub server: String,
    pub database: DatabaseStatus,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub documentation: String,
    pub database: DatabaseStatus,
}
