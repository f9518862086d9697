use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::MessageResponse;

/// Failures surfaced by media operations.
///
/// File-system side effects (unlinking a stored file) never produce one of
/// these; they are logged where they happen.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Missing or oversized file, unsupported content type, malformed id
    #[error("{0}")]
    InvalidInput(String),

    /// No record with that id, or the record's file is gone from disk
    #[error("{0}")]
    NotFound(String),

    /// A backend read or write failed
    #[error("{context}: {cause:#}")]
    Persistence {
        context: &'static str,
        cause: anyhow::Error,
    },
}

impl MediaError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        MediaError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        MediaError::NotFound(message.into())
    }

    pub fn persistence(context: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        MediaError::Persistence {
            context,
            cause: cause.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MediaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MediaError::NotFound(_) => StatusCode::NOT_FOUND,
            MediaError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            MediaError::InvalidInput(message) | MediaError::NotFound(message) => message,
            MediaError::Persistence { context, cause } => {
                tracing::error!("{}: {:#}", context, cause);
                context.to_string()
            }
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}
