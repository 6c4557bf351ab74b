//! Ordered-fallback JSON fetcher
//!
//! Tries each candidate URL once, in order, and returns the first one that
//! answers with a success status and a JSON body. Failures are soft: they are
//! recorded and the next candidate is tried. Only when every candidate has
//! failed does the caller see an error, and that error lists every attempt.

use std::fmt;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{HTTP_TIMEOUT, MAX_BODY_BYTES, USER_AGENT};

/// Why a single candidate was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Upstream answered with a non-success status
    Status(u16),
    /// Connection, timeout or body read failure
    Request(String),
    /// Body was not valid JSON
    InvalidJson(String),
    /// Body exceeded the size limit
    TooLarge(usize),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "HTTP {}", code),
            FailureReason::Request(msg) => write!(f, "request error: {}", msg),
            FailureReason::InvalidJson(msg) => write!(f, "invalid JSON: {}", msg),
            FailureReason::TooLarge(limit) => write!(f, "body exceeds {} bytes", limit),
        }
    }
}

/// A candidate URL together with the reason it was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub url: String,
    pub reason: FailureReason,
}

/// Errors that can occur when fetching from a list of sources
#[derive(Debug, Error)]
pub enum FetchError {
    /// The candidate list was empty
    #[error("no sources configured")]
    NoSources,

    /// Every candidate failed
    #[error("all {} sources failed: {}", .0.len(), describe_failures(.0))]
    AllSourcesFailed(Vec<SourceFailure>),
}

fn describe_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.url, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A successful fetch
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The URL that answered
    pub url: String,
    /// URLs attempted in order, ending with `url`
    pub tried: Vec<String>,
    pub payload: Value,
}

/// Builds the shared upstream client with the bounded request timeout
pub fn build_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
}

/// Fetches JSON from the first healthy source in a candidate list
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http_client: Client,
}

impl SourceFetcher {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Tries `urls` in order and returns the first success
    ///
    /// # Returns
    /// * `Ok(Fetched)` - payload and URL of the first healthy source
    /// * `Err(FetchError::AllSourcesFailed)` - one entry per candidate, in attempt order
    pub async fn fetch_first(&self, urls: &[String]) -> Result<Fetched, FetchError> {
        if urls.is_empty() {
            return Err(FetchError::NoSources);
        }

        let mut tried = Vec::with_capacity(urls.len());
        let mut failures = Vec::new();

        for url in urls {
            tried.push(url.clone());
            match self.fetch_one(url).await {
                Ok(payload) => {
                    debug!(url = %url, "source answered");
                    return Ok(Fetched {
                        url: url.clone(),
                        tried,
                        payload,
                    });
                }
                Err(reason) => {
                    warn!(url = %url, reason = %reason, "source failed, trying next");
                    failures.push(SourceFailure {
                        url: url.clone(),
                        reason,
                    });
                }
            }
        }

        Err(FetchError::AllSourcesFailed(failures))
    }

    async fn fetch_one(&self, url: &str) -> Result<Value, FailureReason> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FailureReason::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureReason::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_BODY_BYTES as u64)
        {
            return Err(FailureReason::TooLarge(MAX_BODY_BYTES));
        }

        // Content-Length may be absent or wrong, so the limit also holds while streaming
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FailureReason::Request(e.to_string()))?
        {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(FailureReason::TooLarge(MAX_BODY_BYTES));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body).map_err(|e| FailureReason::InvalidJson(e.to_string()))
    }
}
