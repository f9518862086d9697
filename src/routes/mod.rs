use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{swagger::ApiDoc, AppState};

pub mod media;
pub mod status;

/// Full application router: API, static uploads and API docs
pub fn build_router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.media_service.storage().upload_path());

    Router::new()
        .route("/", get(status::root))
        .route("/api/status", get(status::get_status))
        .nest("/api/media", media::router())
        .nest_service("/uploads", uploads)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Upload size is enforced while streaming so oversized files can be cleaned up
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
