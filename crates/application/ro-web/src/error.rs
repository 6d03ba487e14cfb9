//! Mapping of pipeline failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ro_search::SearchError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Search(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "search failed");
        } else {
            tracing::warn!(error = %self, "rejected search");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
