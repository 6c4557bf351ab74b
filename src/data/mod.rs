//! Core data models for the shrine proxy
//!
//! Upstream schemas are not contractually fixed, so perk and catalog records
//! stay loosely typed (`serde_json` maps) and are probed field by field. Only
//! the snapshot produced by the pipeline has a fixed shape.

pub mod catalog;
pub mod enrich;
pub mod image;
pub mod source;

pub use catalog::{normalize_catalog, CatalogClient};
pub use enrich::Enricher;
pub use image::{extract_image, normalize_image};
pub use source::{build_http_client, FailureReason, FetchError, Fetched, SourceFailure, SourceFetcher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A perk or catalog record: a string-keyed map of untyped values
pub type Record = Map<String, Value>;

/// Simplified `{ name, image }` view of an enriched perk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub image: Option<String>,
}

/// One fully enriched cache generation
///
/// Snapshots are never mutated after construction; the cache swaps whole
/// snapshots behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// When the shrine payload was fetched
    pub fetched_at: DateTime<Utc>,
    /// The source that answered; always present in `source_tried`
    pub source_used: String,
    /// Sources attempted, in order, up to and including `source_used`
    pub source_tried: Vec<String>,
    /// Raw shrine payload, passed through unchanged
    pub data: Value,
    /// Upstream perks in upstream order, enriched
    pub perks_with_images: Vec<Value>,
    pub images: Vec<ImageRecord>,
}

/// Reads a field as a non-blank string. Numbers are rendered, anything else is ignored.
pub fn field_str(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Returns the first present, non-null, non-blank value among `keys`
pub fn first_value<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| record.get(*key)).find(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// The `perks` list of a shrine payload, or an empty slice when absent
pub fn shrine_perks(payload: &Value) -> &[Value] {
    payload
        .get("perks")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
