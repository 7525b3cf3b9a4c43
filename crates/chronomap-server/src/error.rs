//! Error types for the map API server.
//!
//! [`ApiError`] unifies request-level failures into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! [`AppError`] is what the binary's `main` propagates.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while handling an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A metadata reload ran and failed.
    #[error("reload failed: {0}")]
    ReloadFailed(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::ReloadFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Top-level error for the server binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The initial metadata load failed.
    #[error("failed to load map metadata: {source}")]
    Metadata {
        /// The underlying load error.
        #[from]
        source: chronomap_meta::MetadataError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: crate::server::ServerError,
    },

    /// A background task panicked or was cancelled.
    #[error("task error: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },
}
