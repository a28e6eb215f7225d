//! API error type and its HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notepy_core::StoreError;
use thiserror::Error;

use crate::response::ErrorBody;

/// Any failure a handler can return
#[derive(Error, Debug)]
pub enum ApiError {
    /// A store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed body, bad query string or unsupported parameter
    #[error("{0}")]
    BadRequest(String),

    /// Request body exceeded `server.max_body_bytes`
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Path did not name an existing note
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable code placed in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Store(err) => err.code(),
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::Validation(_) | StoreError::DuplicateTag { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(StoreError::NotFound(_) | StoreError::TagNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Store(StoreError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorBody::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
