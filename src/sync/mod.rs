//! Sync engine: bulk catch-up download plus per-table streaming
//! change feeds, reconciling remote state into the local store without
//! ever exposing a partially synced view.

mod client;
pub mod remote;
pub mod stream;

pub use client::{SyncClient, SyncError};

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;

use crate::store::{Store, Table};

/// Skip the download when the newest sync stamp is younger than this.
pub const STALENESS_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Downloading,
    Subscribing,
    Streaming,
}

/// Outcome of a catch-up attempt. Failures are deliberately
/// non-fatal: the caller keeps serving cached data.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Local data was fresh enough; nothing fetched.
    Skipped,
    /// Snapshot downloaded and applied.
    Completed { rows: usize },
    /// Download failed before any local mutation.
    Failed(SyncError),
}

pub struct SyncEngine {
    store: Store,
    client: SyncClient,
    phase: SyncPhase,
    feeds: Vec<JoinHandle<()>>,
}

impl SyncEngine {
    pub fn new(store: Store, client: SyncClient) -> Self {
        Self {
            store,
            client,
            phase: SyncPhase::Idle,
            feeds: Vec::new(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Catch up if stale, then open the change feeds.
    pub async fn start(&mut self) -> DownloadOutcome {
        let outcome = self.download_if_stale().await;
        self.subscribe_all();
        outcome
    }

    /// Full-snapshot catch-up, skipped when the last sync is younger
    /// than the staleness threshold. On failure the prior local state
    /// stays authoritative and the error is downgraded to a warning.
    pub async fn download_if_stale(&mut self) -> DownloadOutcome {
        match self.store.meta().newest_sync().await {
            Ok(Some(last)) if Utc::now() - last < Duration::seconds(STALENESS_SECS) => {
                tracing::debug!("Sync data is fresh, skipping download");
                return DownloadOutcome::Skipped;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not read sync metadata: {}", e);
            }
        }

        self.phase = SyncPhase::Downloading;
        let outcome = match self.download().await {
            Ok(rows) => DownloadOutcome::Completed { rows },
            Err(e) => {
                tracing::warn!("Sync download failed, keeping cached data: {}", e);
                DownloadOutcome::Failed(e)
            }
        };
        self.phase = SyncPhase::Idle;
        outcome
    }

    /// Fetch everything, then replace everything in one transaction.
    /// Nothing is cleared until the whole remote dataset is in hand.
    async fn download(&self) -> Result<usize, SyncError> {
        let snapshot = self.client.fetch_snapshot().await?;
        let rows = snapshot.row_counts().iter().map(|(_, n)| n).sum();
        self.store.replace_all(&snapshot).await?;
        Ok(rows)
    }

    /// Open one change feed per syncable table.
    pub fn subscribe_all(&mut self) {
        if !self.feeds.is_empty() {
            return;
        }
        self.phase = SyncPhase::Subscribing;
        for table in Table::SYNCABLE {
            let store = self.store.clone();
            let client = self.client.clone();
            self.feeds
                .push(tokio::spawn(stream::run_feed(store, client, table)));
        }
        self.phase = SyncPhase::Streaming;
    }

    /// Tear down all feeds. Safe to call before any subscription
    /// exists and idempotent when called twice.
    pub fn shutdown(&mut self) {
        for handle in self.feeds.drain(..) {
            handle.abort();
        }
        self.phase = SyncPhase::Idle;
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
