//! Gateway error types and their HTTP mapping.
//!
//! Every rejection reaches the client as `{"detail": "<message>"}` so the
//! calling layer can render which invariant was violated. Unknown sessions
//! are 404; every domain rejection is 400; store faults are 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use election_store::StoreError;
use serde_json::json;
use shared_types::AuthorizationError;
use thiserror::Error;

/// Service-level failures (bind, serve, configuration).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid gateway configuration.
    #[error("Invalid gateway configuration: {0}")]
    Config(String),

    /// Could not bind the listen socket.
    #[error("Failed to bind listener: {0}")]
    Bind(String),

    /// The server loop failed.
    #[error("Server failure: {0}")]
    Serve(String),
}

/// A request rejection: HTTP status plus a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status to answer with.
    pub status: StatusCode,
    /// Message for the `detail` field.
    pub detail: String,
}

impl ApiError {
    /// 400 with a detail message.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// 404 with a detail message.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(e: AuthorizationError) -> Self {
        let status = match e {
            AuthorizationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Io(_) | StoreError::SnapshotCorrupted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            detail: e.to_string(),
        }
    }
}
