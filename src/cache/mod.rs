//! Snapshot caching
//!
//! The in-memory [`CacheController`] serves requests and decides when to refresh.
//! The [`SnapshotFile`] keeps the latest successful snapshot on disk for
//! `/shrine.json` and for the one-shot `fetch` command.

mod controller;
mod snapshot_file;

pub use controller::{is_fresh, CacheController, CacheHealth, CacheRead, FallbackPayload};
pub use snapshot_file::SnapshotFile;
