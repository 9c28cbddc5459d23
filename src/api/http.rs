//! HTTP server setup with Axum

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{ApiError, AppState};

/// Where a successful submission sends the browser
pub const MESSAGES_VIEW: &str = "/messages";

/// Create the Axum router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Submissions are never length-limited
        .route(
            "/message",
            post(post_message).layer(DefaultBodyLimit::disable()),
        )
        .route("/messages.json", get(get_messages_json))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /message - append a form submission, then 303 to the messages view
async fn post_message(State(state): State<AppState>, body: Bytes) -> Result<Redirect, ApiError> {
    state.form.accept_async(&body).await?;
    Ok(Redirect::to(MESSAGES_VIEW))
}

/// GET /messages.json - current log snapshot
async fn get_messages_json(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.snapshot.get_snapshot_async().await?;
    Ok((
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        snapshot,
    ))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
