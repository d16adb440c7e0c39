//! # Sync Scheduler
//!
//! Finds playlists due for reconciliation on a fixed interval and
//! dispatches one fire-and-forget sync run per playlist. The scheduler
//! never waits for runs and never retries them; retriability lives in the
//! per-run failure handling of the engine. A companion job purges
//! playlists soft-deleted past the retention window.

use bridge_traits::dispatch::TaskDispatcher;
use bridge_traits::time::{Clock, SystemClock};
use chrono::Duration as ChronoDuration;
use core_runtime::Settings;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::repository::PlaylistRepository;

/// Periodic dispatcher of due sync runs.
pub struct SyncScheduler {
    repository: Arc<dyn PlaylistRepository>,
    dispatcher: Arc<dyn TaskDispatcher>,
    clock: Arc<dyn Clock>,
    /// Tick interval for the periodic loop
    interval: Duration,
    /// Age after which a synced playlist is due again
    stale_after: ChronoDuration,
    /// Soft-delete retention before hard purge
    purge_after: ChronoDuration,
}

impl SyncScheduler {
    pub fn new(
        repository: Arc<dyn PlaylistRepository>,
        dispatcher: Arc<dyn TaskDispatcher>,
        settings: &Settings,
    ) -> Self {
        Self::with_clock(repository, dispatcher, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<dyn PlaylistRepository>,
        dispatcher: Arc<dyn TaskDispatcher>,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
            interval: settings.sync_interval,
            stale_after: ChronoDuration::from_std(settings.sync_stale_after)
                .unwrap_or_else(|_| ChronoDuration::hours(24)),
            purge_after: ChronoDuration::days(i64::from(settings.purge_after_days)),
        }
    }

    /// One scheduling pass: query due playlists, dispatch each. Returns
    /// the number of dispatched runs.
    ///
    /// A failed enqueue is logged and skipped; it never aborts the pass.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<usize> {
        let cutoff = self.clock.now() - self.stale_after;
        let due = self.repository.due_for_sync(cutoff).await?;

        if due.is_empty() {
            info!("No playlists due for synchronization");
            return Ok(0);
        }

        let mut dispatched = 0;
        for playlist_id in due {
            match self.dispatcher.dispatch_sync(playlist_id.into()).await {
                Ok(()) => dispatched += 1,
                Err(e) => {
                    warn!(playlist_id = %playlist_id, error = %e, "Failed to enqueue sync run");
                }
            }
        }

        info!(count = dispatched, "Dispatched sync runs");
        Ok(dispatched)
    }

    /// Companion job: hard-delete playlists soft-deleted longer ago than
    /// the retention window. Returns the number purged.
    #[instrument(skip(self))]
    pub async fn purge_deleted_once(&self) -> Result<u64> {
        let cutoff = self.clock.now() - self.purge_after;
        let purged = self.repository.purge_deleted_before(cutoff).await?;
        if purged > 0 {
            info!(count = purged, "Purged soft-deleted playlists");
        }
        Ok(purged)
    }

    /// Periodic loop: run a scheduling pass and the purge companion on
    /// every tick until cancelled. Pass failures are logged, never fatal.
    pub async fn run_until_cancelled(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        // The immediate first tick runs a pass at startup.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Scheduler stopping");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        warn!(error = %e, "Scheduling pass failed");
                    }
                    if let Err(e) = self.purge_deleted_once().await {
                        warn!(error = %e, "Purge pass failed");
                    }
                }
            }
        }
    }
}
