//! Image field extraction and URL normalization

use super::Record;

/// Fields that may carry an icon reference, highest priority first
pub const IMAGE_FIELDS: [&str; 6] = ["icon", "iconUrl", "iconPath", "image", "perkImage", "perkIcon"];

/// Returns the first non-blank image reference on a record
pub fn extract_image(record: &Record) -> Option<&str> {
    IMAGE_FIELDS
        .iter()
        .filter_map(|field| record.get(*field).and_then(|v| v.as_str()))
        .find(|s| !s.trim().is_empty())
}

/// Makes an image reference absolute against `base_url`
///
/// Absolute `http(s)` URLs are returned unchanged, so normalizing is idempotent.
pub fn normalize_image(reference: &str, base_url: &str) -> String {
    if is_absolute(reference) {
        return reference.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if reference.starts_with('/') {
        format!("{}{}", base, reference)
    } else {
        format!("{}/{}", base, reference)
    }
}

/// Extracts and normalizes in one step
pub fn resolve_image(record: &Record, base_url: &str) -> Option<String> {
    extract_image(record).map(|reference| normalize_image(reference, base_url))
}

fn is_absolute(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
