//! # Synchronization Engine
//!
//! Reconciles one playlist's local track list onto its remote counterpart.
//!
//! ## State machine
//!
//! ```text
//! Unlinked → Linked → Syncing → Synced
//!                        └────→ SyncFailed
//! ```
//!
//! A playlist starts `Unlinked`; linking (a collaborator's concern) sets
//! the remote provider and id. A run serializes on a distributed lock
//! named by the playlist id (non-blocking: a concurrent run for the same
//! playlist aborts rather than queue), checks its preconditions in order
//! (each unmet one a distinct terminal outcome), obtains a valid token,
//! and pushes the provider-filtered local track list with one full-replace
//! call. This is deliberately a full overwrite, never a diff: simplicity
//! and determinism win over minimizing API calls.
//!
//! The only persistence write a run performs is `mark_synced` after the
//! replace succeeds, so a failed run leaves storage untouched. Any error
//! inside a run is caught and reported as a failed run; nothing escapes to
//! crash the scheduler.

use bridge_traits::kv::KeyValueStore;
use bridge_traits::time::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use core_auth::TokenManager;
use core_runtime::error::{sanitized_message, ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::connectors::ConnectorFactory;
use crate::error::SyncError;
use crate::lock::SyncLock;
use crate::repository::{PlaylistId, PlaylistRepository};

/// Lifecycle states of a playlist's remote synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No remote link configured
    Unlinked,
    /// Linked to a remote playlist, no run in flight
    Linked,
    /// A run is in flight
    Syncing,
    /// Last run succeeded
    Synced,
    /// Last run failed
    SyncFailed,
}

impl SyncStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Synced | SyncStatus::SyncFailed)
    }
}

/// Why a run ended in `SyncFailed`.
///
/// The first five are precondition/guard outcomes and are not retriable;
/// `Error` carries the public taxonomy kind plus a sanitized message (the
/// raw error is logged, never surfaced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// A run for this playlist is already in flight
    LockContention,
    /// The playlist does not exist
    PlaylistMissing,
    /// The playlist has no remote provider/id
    NotLinked,
    /// The linked provider is not supported by this engine
    UnsupportedProvider(String),
    /// The owner has no connection for the linked provider
    NoConnection,
    /// The run body failed
    Error { kind: ErrorKind, message: String },
}

/// Outcome of one sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub playlist_id: PlaylistId,
    pub started_at: DateTime<Utc>,
    pub status: SyncStatus,
    pub failure: Option<SyncFailure>,
    /// Number of track URIs pushed to the remote playlist
    pub tracks_pushed: usize,
}

impl SyncReport {
    fn synced(playlist_id: PlaylistId, started_at: DateTime<Utc>, tracks_pushed: usize) -> Self {
        Self {
            playlist_id,
            started_at,
            status: SyncStatus::Synced,
            failure: None,
            tracks_pushed,
        }
    }

    fn failed(playlist_id: PlaylistId, started_at: DateTime<Utc>, failure: SyncFailure) -> Self {
        Self {
            playlist_id,
            started_at,
            status: SyncStatus::SyncFailed,
            failure: Some(failure),
            tracks_pushed: 0,
        }
    }
}

/// Reconciles playlists onto their remote counterparts.
pub struct SyncEngine {
    repository: Arc<dyn PlaylistRepository>,
    token_manager: Arc<TokenManager>,
    connectors: Arc<dyn ConnectorFactory>,
    kv_store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    lock_ttl: Duration,
}

impl SyncEngine {
    pub fn new(
        repository: Arc<dyn PlaylistRepository>,
        token_manager: Arc<TokenManager>,
        connectors: Arc<dyn ConnectorFactory>,
        kv_store: Arc<dyn KeyValueStore>,
        lock_ttl: Duration,
    ) -> Self {
        Self::with_clock(
            repository,
            token_manager,
            connectors,
            kv_store,
            lock_ttl,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        repository: Arc<dyn PlaylistRepository>,
        token_manager: Arc<TokenManager>,
        connectors: Arc<dyn ConnectorFactory>,
        kv_store: Arc<dyn KeyValueStore>,
        lock_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            token_manager,
            connectors,
            kv_store,
            clock,
            lock_ttl,
        }
    }

    /// Run one synchronization for the playlist.
    ///
    /// Never panics and never returns an error: every failure mode ends in
    /// a `SyncFailed` report so the scheduler's loop is unaffected.
    #[instrument(skip(self), fields(playlist_id = %playlist_id))]
    pub async fn sync_playlist(&self, playlist_id: PlaylistId) -> SyncReport {
        let started_at = self.clock.now();

        let mut lock = SyncLock::new(
            self.kv_store.clone(),
            format!("playlist_sync:{}", playlist_id),
            self.lock_ttl,
        );

        // Non-blocking: a second concurrent attempt loses instead of
        // queueing a duplicate replace.
        if let Err(e) = lock.acquire().await {
            let failure = match e {
                SyncError::LockContention { .. } => {
                    info!("Sync already in flight, aborting");
                    SyncFailure::LockContention
                }
                other => {
                    error!(error = %other, "Lock store unavailable");
                    SyncFailure::Error {
                        kind: ErrorKind::Infrastructure,
                        message: sanitized_message(ErrorKind::Infrastructure).to_string(),
                    }
                }
            };
            return SyncReport::failed(playlist_id, started_at, failure);
        }

        let report = self.run_body(playlist_id, started_at).await;
        lock.release().await;

        match &report.status {
            SyncStatus::Synced => info!(tracks = report.tracks_pushed, "Sync completed"),
            _ => warn!(failure = ?report.failure, "Sync did not complete"),
        }
        report
    }

    /// The guarded run body. Every early return is a distinct terminal
    /// outcome; any error becomes a failed report.
    async fn run_body(&self, playlist_id: PlaylistId, started_at: DateTime<Utc>) -> SyncReport {
        let bundle = match self.repository.find_with_connection(playlist_id).await {
            Ok(bundle) => bundle,
            Err(e) => {
                error!(error = %e, "Failed to load playlist");
                return SyncReport::failed(
                    playlist_id,
                    started_at,
                    SyncFailure::Error {
                        kind: e.kind(),
                        message: sanitized_message(e.kind()).to_string(),
                    },
                );
            }
        };

        let Some(bundle) = bundle else {
            return SyncReport::failed(playlist_id, started_at, SyncFailure::PlaylistMissing);
        };
        let playlist = bundle.playlist;

        let (provider, remote_id) = match (playlist.remote_provider, playlist.remote_id.clone()) {
            (Some(provider), Some(remote_id)) => (provider, remote_id),
            _ => {
                return SyncReport::failed(playlist_id, started_at, SyncFailure::NotLinked);
            }
        };

        if !self.connectors.supports(provider) {
            return SyncReport::failed(
                playlist_id,
                started_at,
                SyncFailure::UnsupportedProvider(provider.as_str().to_string()),
            );
        }

        let Some(connection) = bundle.connection else {
            return SyncReport::failed(playlist_id, started_at, SyncFailure::NoConnection);
        };

        let access_token = match self.token_manager.get_valid_token(&connection).await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "Token refresh failed during sync");
                return SyncReport::failed(
                    playlist_id,
                    started_at,
                    SyncFailure::Error {
                        kind: e.kind(),
                        message: sanitized_message(e.kind()).to_string(),
                    },
                );
            }
        };

        let connector = self.connectors.connector(&connection, access_token);
        let uris = playlist.provider_uris(provider);

        // Full overwrite of the remote list, never a diff.
        if let Err(e) = connector.replace_tracks(&remote_id, &uris).await {
            error!(error = %e, "Full-replace call failed");
            return SyncReport::failed(
                playlist_id,
                started_at,
                SyncFailure::Error {
                    kind: ErrorKind::ExternalService,
                    message: sanitized_message(ErrorKind::ExternalService).to_string(),
                },
            );
        }

        if let Err(e) = self.repository.mark_synced(playlist_id, started_at).await {
            error!(error = %e, "Failed to persist last_synced_at");
            return SyncReport::failed(
                playlist_id,
                started_at,
                SyncFailure::Error {
                    kind: e.kind(),
                    message: sanitized_message(e.kind()).to_string(),
                },
            );
        }

        SyncReport::synced(playlist_id, started_at, uris.len())
    }
}
