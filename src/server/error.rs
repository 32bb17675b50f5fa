// src/server/error.rs
// =============================================================================
// Converts handler errors into HTTP responses.
//
// Every error becomes a JSON body {"error": "..."} with a status code:
// - 400 for bad input (empty URL, malformed seed)
// - 502 when the seed document could not be fetched
// =============================================================================

use crate::crawl::CrawlError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    source: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            source: anyhow::anyhow!(message.into()),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CrawlError> for AppError {
    fn from(err: CrawlError) -> Self {
        let status = if err.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        Self {
            status,
            source: err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.source);
        if self.status.is_server_error() {
            error!(status = %self.status, error = %message, "request failed");
        }
        (self.status, Json(json!({ "error": message }))).into_response()
    }
}
