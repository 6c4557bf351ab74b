//! Perk catalog client
//!
//! The catalog uses the same ordered-fallback fetch as the shrine. Catalog
//! endpoints disagree on shape: some return a bare array, some wrap it in
//! `data`, and some return an object keyed by perk id. All three are flattened
//! into a list of records.

use serde_json::Value;

use super::source::{FetchError, SourceFetcher};
use super::Record;

/// Client for the secondary perk catalog
#[derive(Debug, Clone)]
pub struct CatalogClient {
    fetcher: SourceFetcher,
    sources: Vec<String>,
}

impl CatalogClient {
    pub fn new(fetcher: SourceFetcher, sources: Vec<String>) -> Self {
        Self { fetcher, sources }
    }

    /// Fetches the catalog and flattens it into entries
    pub async fn fetch_entries(&self) -> Result<Vec<Record>, FetchError> {
        let fetched = self.fetcher.fetch_first(&self.sources).await?;
        Ok(normalize_catalog(fetched.payload))
    }
}

/// Flattens any supported catalog shape into a list of entries
///
/// * `[ {...}, ... ]` is used as is
/// * `{ "data": [ ... ] }` uses the wrapped array
/// * `{ "<id>": {...}, ... }` becomes `{ "id": "<id>", ...fields }` per key,
///   with the value's own fields taking precedence over the injected `id`
///
/// Non-object array items are dropped.
pub fn normalize_catalog(payload: Value) -> Vec<Record> {
    match payload {
        Value::Array(items) => objects(items),
        Value::Object(mut map) => {
            if matches!(map.get("data"), Some(Value::Array(_))) {
                if let Some(Value::Array(items)) = map.remove("data") {
                    return objects(items);
                }
            }

            map.into_iter()
                .map(|(key, value)| {
                    let mut entry = Record::new();
                    entry.insert("id".to_string(), Value::String(key));
                    if let Value::Object(fields) = value {
                        entry.extend(fields);
                    }
                    entry
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

fn objects(items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
