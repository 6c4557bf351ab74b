//! HTTP surface
//!
//! `/shrine` reads through the cache, `/shrine.json` serves the snapshot file
//! verbatim and `/health` reports cache state. Every response body is JSON.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::cache::{CacheController, CacheRead, SnapshotFile};
use crate::data::Snapshot;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheController>,
    pub snapshot_file: SnapshotFile,
}

/// A previous snapshot served after a failed refresh, flagged as such
#[derive(Serialize)]
struct StaleSnapshot<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    stale: bool,
    error: &'a str,
}

/// Builds the router with request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/shrine", get(shrine))
        .route("/shrine.json", get(shrine_file))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shrine(State(state): State<AppState>) -> Response {
    match state.cache.read(false).await {
        CacheRead::Fresh(snapshot) => Json(snapshot.as_ref()).into_response(),
        CacheRead::Stale { snapshot, error } => Json(StaleSnapshot {
            snapshot: &snapshot,
            stale: true,
            error: &error,
        })
        .into_response(),
        CacheRead::Fallback(payload) => Json(payload).into_response(),
        CacheRead::Unavailable(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Could not fetch shrine data"})),
        )
            .into_response(),
    }
}

async fn shrine_file(State(state): State<AppState>) -> Response {
    match state.snapshot_file.read_raw().await {
        Ok(Some(body)) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Snapshot not found"})),
        )
            .into_response(),
        Err(e) => {
            error!(path = %state.snapshot_file.path().display(), error = %e, "failed to read snapshot file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Could not read snapshot"})),
            )
                .into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cache.health())
}
