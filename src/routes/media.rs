use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    errors::MediaError,
    models::{MediaListResponse, MediaRecord, MessageResponse},
    services::IncomingUpload,
    storage::{LocalUploadStorage, MAX_UPLOAD_BYTES},
    AppState,
};

const UPLOAD_FIELD: &str = "file";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_media))
        .route("/upload", post(upload_media))
        .route("/{id}", get(get_media).delete(delete_media))
        .route("/{id}/like", post(like_media))
        .route("/{id}/unlike", post(unlike_media))
}

/// Multipart form accepted by the upload endpoint
#[derive(ToSchema)]
pub struct UploadForm {
    /// Image or video file, at most 10 MB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GetMediaQuery {
    /// Serve the file as an attachment instead of inline
    #[serde(default)]
    pub download: bool,
}

/// `<scheme>://<host>` as seen by the client
fn request_base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

/// Stream one multipart field to a new file in the uploads directory.
///
/// Writing stops as soon as the running size passes the upload limit; the
/// reported size then exceeds the limit and the service rejects it.
async fn receive_upload(
    storage: &LocalUploadStorage,
    mut field: Field<'_>,
) -> Result<IncomingUpload, MediaError> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut target = storage
        .create_upload(&original_name)
        .await
        .map_err(|e| MediaError::persistence("Upload failed", e))?;

    let mut size: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                warn!("Upload of '{}' interrupted: {}", original_name, e);
                drop(target.file);
                storage.remove_file(&target.public_path).await;
                return Err(MediaError::invalid_input(format!("Invalid multipart payload: {}", e)));
            }
        };

        size += chunk.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            break;
        }
        if let Err(e) = target.file.write_all(&chunk).await {
            error!("Failed to write upload '{}': {}", original_name, e);
            drop(target.file);
            storage.remove_file(&target.public_path).await;
            return Err(MediaError::persistence("Upload failed", e));
        }
    }

    if let Err(e) = target.file.flush().await {
        drop(target.file);
        storage.remove_file(&target.public_path).await;
        return Err(MediaError::persistence("Upload failed", e));
    }

    Ok(IncomingUpload {
        original_name,
        content_type,
        filepath: target.public_path,
        size,
    })
}

#[utoipa::path(
    post,
    path = "/api/media/upload",
    tag = "media",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media uploaded", body = MediaRecord),
        (status = 400, description = "No file, file too large, or unsupported type", body = MessageResponse),
        (status = 500, description = "Upload failed", body = MessageResponse)
    )
)]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaRecord>), MediaError> {
    let service = &state.media_service;
    let mut upload = None;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| MediaError::invalid_input(format!("Invalid multipart payload: {}", e)))?;
        let Some(field) = field else { break };

        if field.name() == Some(UPLOAD_FIELD) && field.file_name().is_some() {
            upload = Some(receive_upload(service.storage(), field).await?);
            break;
        }
    }

    let record = service.upload(upload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/media",
    tag = "media",
    responses(
        (status = 200, description = "All media, newest first", body = MediaListResponse),
        (status = 500, description = "Server error", body = MessageResponse)
    )
)]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MediaListResponse>, MediaError> {
    let base_url = request_base_url(&headers);
    let media = state.media_service.list(&base_url).await?;
    Ok(Json(media))
}

#[utoipa::path(
    get,
    path = "/api/media/{id}",
    tag = "media",
    params(
        ("id" = String, Path, description = "Media ID"),
        GetMediaQuery
    ),
    responses(
        (status = 200, description = "The media file, served as image/jpeg or video/mp4"),
        (status = 400, description = "Invalid media ID format", body = MessageResponse),
        (status = 404, description = "Media or its file not found", body = MessageResponse)
    )
)]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<GetMediaQuery>,
) -> Result<Response, MediaError> {
    let media = state.media_service.get_by_id(&id).await?;

    let file = tokio::fs::File::open(&media.path).await.map_err(|e| {
        warn!("Failed to open {}: {}", media.path.display(), e);
        MediaError::not_found("Media file not found on disk")
    })?;

    let disposition = if query.download { "attachment" } else { "inline" };
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, media.record.media_type.serving_content_type()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/media/{id}/like",
    tag = "media",
    params(("id" = String, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Updated media", body = MediaRecord),
        (status = 400, description = "Invalid media ID format", body = MessageResponse),
        (status = 404, description = "Media not found", body = MessageResponse)
    )
)]
pub async fn like_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MediaRecord>, MediaError> {
    Ok(Json(state.media_service.like(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/media/{id}/unlike",
    tag = "media",
    params(("id" = String, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Updated media, likes never below zero", body = MediaRecord),
        (status = 400, description = "Invalid media ID format", body = MessageResponse),
        (status = 404, description = "Media not found", body = MessageResponse)
    )
)]
pub async fn unlike_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MediaRecord>, MediaError> {
    Ok(Json(state.media_service.unlike(&id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = String, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media deleted", body = MessageResponse),
        (status = 400, description = "Invalid media ID format", body = MessageResponse),
        (status = 404, description = "Media not found", body = MessageResponse)
    )
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, MediaError> {
    Ok(Json(state.media_service.delete(&id).await?))
}
