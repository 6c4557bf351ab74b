//! Shared helpers for unit tests: local upstream servers and a stub snapshot source

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::data::{FailureReason, FetchError, ImageRecord, Snapshot, SourceFailure};
use crate::pipeline::SnapshotSource;

/// A canned upstream response
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Body(u16, String),
    Json(Value),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let code = |c: u16| StatusCode::from_u16(c).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self {
            Reply::Status(c) => code(c).into_response(),
            Reply::Body(c, body) => (code(c), body).into_response(),
            Reply::Json(value) => Json(value).into_response(),
        }
    }
}

/// Serves `routes` on an ephemeral loopback port and returns the base URL
pub async fn spawn_upstream(routes: Vec<(&'static str, Reply)>) -> String {
    let mut router = Router::new();
    for (path, reply) in routes {
        router = router.route(
            path,
            get(move || {
                let reply = reply.clone();
                async move { reply }
            }),
        );
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test upstream");
    let addr = listener.local_addr().expect("Failed to read test upstream address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{}", addr)
}

/// The snapshot [`StubSource`] hands out
pub fn snapshot_at(fetched_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        fetched_at,
        source_used: "https://stub/shrine".to_string(),
        source_tried: vec!["https://stub/shrine".to_string()],
        data: json!({"perks": [{"id": "k28p02"}]}),
        perks_with_images: vec![json!({"id": "k28p02", "name": "Darkness Revealed"})],
        images: vec![ImageRecord {
            name: "Darkness Revealed".to_string(),
            image: None,
        }],
    }
}

/// Counts calls and can be switched into failure
#[derive(Clone)]
pub struct StubSource {
    fetched_at: DateTime<Utc>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Duration,
}

impl StubSource {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotSource for StubSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::AllSourcesFailed(vec![SourceFailure {
                url: "https://stub/shrine".to_string(),
                reason: FailureReason::Status(503),
            }]));
        }
        Ok(snapshot_at(self.fetched_at))
    }
}
