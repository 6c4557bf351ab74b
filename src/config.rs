//! Built-in endpoints, timings and the resolved runtime configuration
//!
//! Everything an operator cannot change lives here as a constant. The only
//! operator-facing knobs are the source list and the snapshot file location,
//! which the CLI folds into a [`Config`].

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

/// Shrine mirrors tried in order when the operator does not supply a list
pub const DEFAULT_SHRINE_SOURCES: [&str; 2] = [
    "https://dbd.tricky.lol/api/shrine",
    "https://api.nightlight.gg/v1/shrine",
];

/// Perk catalog endpoints used for enrichment
pub const CATALOG_SOURCES: [&str; 1] = ["https://dbd.tricky.lol/api/perks"];

/// Host that relative image paths are resolved against
pub const IMAGE_BASE_URL: &str = "https://dbd.tricky.lol";

/// The shrine rotates weekly; used as cache TTL and background refresh period
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound for any single upstream request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent with every upstream request
pub const USER_AGENT: &str = concat!("shrine-proxy/", env!("CARGO_PKG_VERSION"));

/// Largest upstream body accepted before the source is skipped
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Display names that upstream and catalog get wrong, keyed by lower-cased perk id
pub const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("k28p02", "Darkness Revealed"),
    ("k32p02", "Forced Hesitation"),
];

/// Runtime configuration resolved from CLI flags and environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Shrine sources in priority order
    pub shrine_sources: Vec<String>,
    /// Catalog sources in priority order
    pub catalog_sources: Vec<String>,
    /// Where the snapshot file is written and served from
    pub snapshot_file: PathBuf,
    /// Cache TTL and background refresh period
    pub refresh_interval: Duration,
}

impl Config {
    /// Builds a config from the operator's source list, which wins over the
    /// built-in mirrors whenever it has at least one non-blank entry.
    pub fn new(operator_sources: &[String], snapshot_file: Option<PathBuf>) -> Self {
        Self {
            shrine_sources: resolve_sources(operator_sources),
            catalog_sources: CATALOG_SOURCES.iter().map(|s| s.to_string()).collect(),
            snapshot_file: snapshot_file.unwrap_or_else(default_snapshot_path),
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

/// Picks the operator list (blank entries dropped) or falls back to the defaults
pub fn resolve_sources(operator_sources: &[String]) -> Vec<String> {
    let cleaned: Vec<String> = operator_sources
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        DEFAULT_SHRINE_SOURCES.iter().map(|s| s.to_string()).collect()
    } else {
        cleaned
    }
}

/// `~/.cache/shrine-proxy/shrine.json` on Linux, `./shrine.json` without a home directory
pub fn default_snapshot_path() -> PathBuf {
    ProjectDirs::from("", "", "shrine-proxy")
        .map(|dirs| dirs.cache_dir().join("shrine.json"))
        .unwrap_or_else(|| PathBuf::from("shrine.json"))
}

/// Looks up a curated display name for a lower-cased perk id
pub fn override_name(key: &str) -> Option<&'static str> {
    NAME_OVERRIDES
        .iter()
        .find(|(id, _)| *id == key)
        .map(|(_, name)| *name)
}
