use utoipa::OpenApi;

use crate::db::DatabaseType;
use crate::models::{
    DatabaseStatus, MediaListResponse, MediaRecord, MediaType, MediaView, MessageResponse,
    RootResponse, StatusResponse,
};
use crate::routes::{media, status};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Media API",
        description = "Upload, browse, like and delete images and videos"
    ),
    paths(
        status::root,
        status::get_status,
        media::upload_media,
        media::list_media,
        media::get_media,
        media::like_media,
        media::unlike_media,
        media::delete_media,
    ),
    components(schemas(
        MediaRecord,
        MediaType,
        MediaView,
        MediaListResponse,
        MessageResponse,
        DatabaseType,
        DatabaseStatus,
        StatusResponse,
        RootResponse,
        media::UploadForm,
    )),
    tags(
        (name = "media", description = "Media upload and catalog"),
        (name = "status", description = "Server and database status")
    )
)]
pub struct ApiDoc;
