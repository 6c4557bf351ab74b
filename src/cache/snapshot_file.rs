//! On-disk snapshot file
//!
//! Persists the latest snapshot as pretty JSON so it can be served verbatim
//! at `/shrine.json` and consumed by other tools. Writes go to a temporary
//! sibling first and are renamed into place, so readers never observe a
//! half-written file.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::data::Snapshot;

/// Reads and writes the snapshot file at a fixed path
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "shrine.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes the snapshot, creating parent directories as needed
    pub async fn write(&self, snapshot: &Snapshot) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let temp = self.temp_path();
        fs::write(&temp, json).await?;
        fs::rename(&temp, &self.path).await
    }

    /// Returns the file contents verbatim, or `None` if nothing has been written yet
    pub async fn read_raw(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[cfg(test)]
    pub(crate) async fn read(&self) -> Option<Snapshot> {
        let content = self.read_raw().await.ok()??;
        serde_json::from_str(&content).ok()
    }
}
