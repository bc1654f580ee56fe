use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::MediaKind;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Non-2xx answer from the catalog API
    #[error("Catalog request {endpoint} failed with status {status}")]
    Request { endpoint: String, status: u16 },

    /// The subject's own details or credits could not be loaded
    #[error("Recommendations for {kind} {id} unavailable: {source}")]
    Aggregation {
        kind: MediaKind,
        id: u64,
        #[source]
        source: Box<AppError>,
    },

    #[error("Catalog request {endpoint} timed out after {after_ms}ms")]
    Timeout { endpoint: String, after_ms: u64 },

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status of a failed catalog request, looking through aggregation failures
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Request { status, .. } => Some(*status),
            AppError::Aggregation { source, .. } => source.upstream_status(),
            _ => None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Request { status: 404, .. } | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Aggregation { .. } if self.upstream_status() == Some(404) => {
                StatusCode::NOT_FOUND
            }
            AppError::Request { .. }
            | AppError::Aggregation { .. }
            | AppError::HttpClient(_)
            | AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Cache(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
