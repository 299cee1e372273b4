// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Session credential is missing entirely.
    #[error("Authentication required")]
    Forbidden,

    /// Session credential is present but malformed.
    #[error("Invalid session token")]
    Unauthorized,

    /// OAuth code exchange or identity verification failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// YouTube Data API call failed or returned an unexpected shape.
    #[error("YouTube API error: {0}")]
    YouTubeApi(String),

    /// Referenced video id is not in the user's synced uploads.
    #[error("Video not in library: {0}")]
    NotFoundInLibrary(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Provider or store call exceeded its deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body. Matches the `{status, msg}` envelope the
/// success responses use so clients can branch on `status` alone.
#[derive(Serialize)]
struct ErrorResponse {
    status: bool,
    msg: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            // Deliberately coarse: every provider-side login failure collapses
            // to one user-facing message carrying the underlying text.
            AppError::OAuth(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unable to login please try again: {}", msg),
            ),
            AppError::YouTubeApi(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::NotFoundInLibrary(video_id) => (
                StatusCode::NOT_FOUND,
                format!("Video {} is not in your library", video_id),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Store failures carry the underlying message, same as the
            // provider-side kinds; only stack traces stay out of the body.
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Timeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg.clone()),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        let body = ErrorResponse { status: false, msg };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
