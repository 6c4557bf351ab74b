//! Joins shrine perks with catalog metadata
//!
//! Perks and catalog entries meet on a normalized key: the lower-cased string
//! form of the perk `id`, or of the catalog entry's `id`, `perkId` or `name`.
//! A curated override table has the final say on display names.

use std::collections::HashMap;

use serde_json::Value;

use super::image::{normalize_image, resolve_image};
use super::{field_str, first_value, ImageRecord, Record};
use crate::config::{IMAGE_BASE_URL, NAME_OVERRIDES};

const CATALOG_KEY_FIELDS: [&str; 3] = ["id", "perkId", "name"];
const NAME_FIELDS: [&str; 2] = ["name", "displayName"];
const ROLE_FIELDS: [&str; 2] = ["role", "roleCategory"];
const CHARACTER_FIELDS: [&str; 4] = ["character", "owner", "survivor", "killer"];

/// Applies catalog data, name overrides and image normalization to perks
#[derive(Debug, Clone)]
pub struct Enricher {
    image_base: String,
    overrides: HashMap<String, String>,
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(IMAGE_BASE_URL, NAME_OVERRIDES)
    }
}

impl Enricher {
    pub fn new(image_base: &str, overrides: &[(&str, &str)]) -> Self {
        Self {
            image_base: image_base.to_string(),
            overrides: overrides
                .iter()
                .map(|(id, name)| (id.to_lowercase(), name.to_string()))
                .collect(),
        }
    }

    /// Merges perks with catalog entries, preserving perk count and order
    ///
    /// Perks with neither a catalog match nor an override are returned unchanged.
    pub fn merge(&self, perks: &[Value], catalog: &[Record]) -> Vec<Value> {
        let lookup = index_catalog(catalog);

        perks
            .iter()
            .map(|perk| match perk.as_object() {
                Some(record) => self.merge_one(record, &lookup).unwrap_or_else(|| perk.clone()),
                None => perk.clone(),
            })
            .collect()
    }

    /// Degraded enrichment used when the catalog is unavailable: normalizes
    /// each perk's image and applies name overrides, nothing else.
    pub fn images_only(&self, perks: &[Value]) -> Vec<Value> {
        perks
            .iter()
            .map(|perk| {
                let Some(record) = perk.as_object() else {
                    return perk.clone();
                };
                let mut out = record.clone();
                if let Some(image) = resolve_image(record, &self.image_base) {
                    out.insert("image".to_string(), Value::String(image));
                }
                if let Some(name) = self.override_for(&perk_key(record)) {
                    out.insert("name".to_string(), Value::String(name.to_string()));
                }
                Value::Object(out)
            })
            .collect()
    }

    /// Builds the `{ name, image }` list for enriched perks
    ///
    /// The `image` set during enrichment wins; perks passed through unchanged
    /// fall back to their own icon fields.
    pub fn image_records(&self, perks: &[Value]) -> Vec<ImageRecord> {
        perks
            .iter()
            .filter_map(Value::as_object)
            .map(|record| ImageRecord {
                name: field_str(record, "name")
                    .or_else(|| field_str(record, "id"))
                    .unwrap_or_default(),
                image: field_str(record, "image")
                    .map(|image| normalize_image(&image, &self.image_base))
                    .or_else(|| resolve_image(record, &self.image_base)),
            })
            .collect()
    }

    fn override_for(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.overrides.get(key).map(String::as_str)
    }

    fn merge_one(&self, perk: &Record, lookup: &HashMap<String, &Record>) -> Option<Value> {
        let key = perk_key(perk);
        let entry = if key.is_empty() { None } else { lookup.get(&key).copied() };
        let override_name = self.override_for(&key);

        if entry.is_none() && override_name.is_none() {
            return None;
        }

        let mut out = perk.clone();

        let name = override_name
            .map(str::to_string)
            .or_else(|| entry.and_then(|e| NAME_FIELDS.iter().find_map(|f| field_str(e, f))))
            .or_else(|| field_str(perk, "name"))
            .unwrap_or_else(|| key.clone());
        out.insert("name".to_string(), Value::String(name));

        if let Some(entry) = entry {
            if let Some(description) = first_value(entry, &["description"]) {
                out.insert("description".to_string(), description.clone());
            }
            if let Some(role) = first_value(entry, &ROLE_FIELDS) {
                out.insert("role".to_string(), role.clone());
            }
            if let Some(character) = first_value(entry, &CHARACTER_FIELDS) {
                out.insert("character".to_string(), character.clone());
            }
        }

        let image = entry
            .and_then(|e| resolve_image(e, &self.image_base))
            .or_else(|| resolve_image(perk, &self.image_base));
        if let Some(image) = image {
            out.insert("image".to_string(), Value::String(image));
        }

        Some(Value::Object(out))
    }
}

/// Indexes catalog entries by normalized key; later entries win on collision
fn index_catalog(catalog: &[Record]) -> HashMap<String, &Record> {
    let mut lookup = HashMap::with_capacity(catalog.len());
    for entry in catalog {
        let key = CATALOG_KEY_FIELDS
            .iter()
            .find_map(|f| field_str(entry, f))
            .map(|k| k.to_lowercase())
            .unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        lookup.insert(key, entry);
    }
    lookup
}

fn perk_key(perk: &Record) -> String {
    field_str(perk, "id").map(|k| k.to_lowercase()).unwrap_or_default()
}
