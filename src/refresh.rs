//! Background snapshot refresh
//!
//! Periodically forces a cache refresh and persists each new snapshot to the
//! snapshot file. Failures are logged and the previous snapshot keeps serving.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cache::{CacheController, SnapshotFile};
use crate::data::{FetchError, Snapshot};

/// Forces one refresh and writes the result to the snapshot file
///
/// A file write failure is logged but does not fail the refresh; the in-memory
/// snapshot has already been replaced.
pub async fn refresh_once(
    cache: &CacheController,
    snapshot_file: &SnapshotFile,
) -> Result<Arc<Snapshot>, FetchError> {
    let snapshot = cache.get(true).await?;
    if let Err(e) = snapshot_file.write(&snapshot).await {
        warn!(path = %snapshot_file.path().display(), error = %e, "failed to write snapshot file");
    }
    Ok(snapshot)
}

/// Handle for the background refresh task
pub struct RefreshHandle {
    task: JoinHandle<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the refresh loop, forcing a refresh every `every`
    ///
    /// The first refresh happens one full interval after spawning; the startup
    /// warm-up is the caller's job.
    pub fn spawn(cache: Arc<CacheController>, snapshot_file: SnapshotFile, every: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        info!(interval_secs = every.as_secs(), "starting background refresh");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // Skip the first tick (immediate)
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match refresh_once(&cache, &snapshot_file).await {
                            Ok(snapshot) => info!(
                                source = %snapshot.source_used,
                                perks = snapshot.perks_with_images.len(),
                                "scheduled refresh completed"
                            ),
                            Err(e) => error!(error = %e, "scheduled refresh failed, keeping previous snapshot"),
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self { task, shutdown_tx }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the refresh loop and waits for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}
