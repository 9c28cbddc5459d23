//! HTTP surface for the message board
//!
//! - `POST /message` - form submission, redirects to `/messages`
//! - `GET /messages.json` - full log snapshot
//! - `GET /health` - liveness check

pub mod http;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::ingest::FormAdapter;
use crate::snapshot::{SnapshotError, SnapshotReader};
use crate::store::{MessageStore, StoreError};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub form: FormAdapter,
    pub snapshot: SnapshotReader,
}

impl AppState {
    /// Wire both HTTP-facing components to the same store
    pub fn new(store: Arc<MessageStore>) -> Self {
        Self {
            form: FormAdapter::new(Arc::clone(&store)),
            snapshot: SnapshotReader::new(store),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            code: "INTERNAL_ERROR".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "Message store failure");
        ApiError::internal(e.to_string())
    }
}

impl From<SnapshotError> for ApiError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::NotFound => ApiError::not_found("Messages data not found"),
            SnapshotError::Store(e) => e.into(),
            SnapshotError::Encode(e) => {
                error!(error = %e, "Snapshot encoding failure");
                ApiError::internal(e.to_string())
            }
        }
    }
}
