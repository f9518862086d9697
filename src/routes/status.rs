use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use crate::{
    models::{DatabaseStatus, RootResponse, StatusResponse},
    AppState,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "status",
    responses(
        (status = 200, description = "Server is running", body = RootResponse)
    )
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Media API Server is running!".to_string(),
        documentation: "Visit /api-docs for API documentation".to_string(),
        database: DatabaseStatus {
            description: None,
            ..state.media_service.status()
        },
    })
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "Active database backend", body = StatusResponse)
    )
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        server: "running".to_string(),
        database: state.media_service.status(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
