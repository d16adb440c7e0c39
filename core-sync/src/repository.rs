//! Playlist Persistence Seam
//!
//! The relational store holding playlists is a collaborator; this module
//! defines the queries the engine and scheduler need from it, the
//! sync-relevant playlist model, and an in-memory implementation used by
//! tests and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_auth::{ProviderKind, ServiceConnection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::engine::SyncStatus;
use crate::error::Result;

/// Unique identifier for a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistId(Uuid);

impl PlaylistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaylistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PlaylistId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<PlaylistId> for Uuid {
    fn from(id: PlaylistId) -> Self {
        id.0
    }
}

/// One locally-stored track reference: a catalog URI plus the provider it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTrackRef {
    pub uri: String,
    pub provider: String,
}

/// Sync-relevant fields of a persisted playlist.
///
/// `remote_provider`/`remote_id` are set once when the playlist is linked
/// and immutable thereafter; relinking is conceptually a new link.
/// `last_synced_at` is written only by a successful sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: Uuid,
    pub name: String,
    pub remote_provider: Option<ProviderKind>,
    pub remote_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub tracks: Vec<LocalTrackRef>,
}

impl Playlist {
    /// Whether both remote link fields are set.
    pub fn is_linked(&self) -> bool {
        self.remote_provider.is_some() && self.remote_id.is_some()
    }

    /// Where this playlist sits in the sync lifecycle, as far as stored
    /// state can tell. A run in flight (`Syncing`) and a failed run
    /// (`SyncFailed`) are only visible on the engine's reports.
    pub fn sync_status(&self) -> SyncStatus {
        if !self.is_linked() {
            SyncStatus::Unlinked
        } else if self.last_synced_at.is_some() {
            SyncStatus::Synced
        } else {
            SyncStatus::Linked
        }
    }

    /// Local track URIs filtered to the given provider, in playlist order.
    pub fn provider_uris(&self, provider: ProviderKind) -> Vec<String> {
        self.tracks
            .iter()
            .filter(|t| t.provider == provider.as_str())
            .map(|t| t.uri.clone())
            .collect()
    }
}

/// The triple a sync run loads in one query: the playlist and its owner's
/// matching connection (when one exists).
#[derive(Debug, Clone)]
pub struct SyncBundle {
    pub playlist: Playlist,
    pub connection: Option<ServiceConnection>,
}

/// Queries the sync engine and scheduler need from playlist persistence.
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Load a playlist together with its owner's connection for the
    /// linked provider, in one query.
    async fn find_with_connection(&self, id: PlaylistId) -> Result<Option<SyncBundle>>;

    /// Playlists that are linked, not soft-deleted, and never synced or
    /// last synced at/before `cutoff`.
    async fn due_for_sync(&self, cutoff: DateTime<Utc>) -> Result<Vec<PlaylistId>>;

    /// Record a successful sync. The only playlist mutation a sync run
    /// performs.
    async fn mark_synced(&self, id: PlaylistId, at: DateTime<Utc>) -> Result<()>;

    /// Hard-delete playlists soft-deleted at/before `cutoff`. Returns the
    /// number purged.
    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// In-memory playlist repository.
#[derive(Default)]
pub struct MemoryPlaylistRepository {
    playlists: Mutex<HashMap<PlaylistId, Playlist>>,
    connections: Mutex<Vec<ServiceConnection>>,
}

impl MemoryPlaylistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_playlist(&self, playlist: Playlist) {
        let mut playlists = self.playlists.lock().await;
        playlists.insert(playlist.id, playlist);
    }

    pub async fn insert_connection(&self, connection: ServiceConnection) {
        let mut connections = self.connections.lock().await;
        connections.push(connection);
    }

    pub async fn get(&self, id: PlaylistId) -> Option<Playlist> {
        let playlists = self.playlists.lock().await;
        playlists.get(&id).cloned()
    }
}

#[async_trait]
impl PlaylistRepository for MemoryPlaylistRepository {
    async fn find_with_connection(&self, id: PlaylistId) -> Result<Option<SyncBundle>> {
        let playlists = self.playlists.lock().await;
        let Some(playlist) = playlists.get(&id).cloned() else {
            return Ok(None);
        };

        let connection = match playlist.remote_provider {
            Some(provider) => {
                let connections = self.connections.lock().await;
                connections
                    .iter()
                    .find(|c| c.owner_id == playlist.owner_id && c.provider == provider)
                    .cloned()
            }
            None => None,
        };

        Ok(Some(SyncBundle {
            playlist,
            connection,
        }))
    }

    async fn due_for_sync(&self, cutoff: DateTime<Utc>) -> Result<Vec<PlaylistId>> {
        let playlists = self.playlists.lock().await;
        Ok(playlists
            .values()
            .filter(|p| p.is_linked())
            .filter(|p| p.deleted_at.is_none())
            .filter(|p| match p.last_synced_at {
                None => true,
                Some(at) => at <= cutoff,
            })
            .map(|p| p.id)
            .collect())
    }

    async fn mark_synced(&self, id: PlaylistId, at: DateTime<Utc>) -> Result<()> {
        let mut playlists = self.playlists.lock().await;
        if let Some(playlist) = playlists.get_mut(&id) {
            playlist.last_synced_at = Some(at);
        }
        Ok(())
    }

    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut playlists = self.playlists.lock().await;
        let before = playlists.len();
        playlists.retain(|_, p| match p.deleted_at {
            Some(deleted_at) => deleted_at > cutoff,
            None => true,
        });
        Ok((before - playlists.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn playlist(owner_id: Uuid) -> Playlist {
        Playlist {
            id: PlaylistId::new(),
            owner_id,
            name: "Test Playlist".to_string(),
            remote_provider: Some(ProviderKind::Spotify),
            remote_id: Some("abc".to_string()),
            last_synced_at: None,
            deleted_at: None,
            tracks: vec![
                LocalTrackRef {
                    uri: "spotify:track:1".to_string(),
                    provider: "spotify".to_string(),
                },
                LocalTrackRef {
                    uri: "tidal:track:2".to_string(),
                    provider: "tidal".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_provider_uris_filters_by_provider() {
        let p = playlist(Uuid::new_v4());
        assert_eq!(p.provider_uris(ProviderKind::Spotify), vec!["spotify:track:1"]);
    }

    #[test]
    fn test_sync_status_from_stored_state() {
        let mut p = playlist(Uuid::new_v4());
        assert_eq!(p.sync_status(), SyncStatus::Linked);

        p.last_synced_at = Some(Utc::now());
        assert_eq!(p.sync_status(), SyncStatus::Synced);

        p.remote_provider = None;
        p.remote_id = None;
        assert_eq!(p.sync_status(), SyncStatus::Unlinked);
    }

    #[tokio::test]
    async fn test_due_for_sync_selection() {
        let repo = MemoryPlaylistRepository::new();
        let now = Utc::now();
        let cutoff = now - Duration::hours(24);

        // Never synced: due.
        let never_synced = playlist(Uuid::new_v4());
        let never_synced_id = never_synced.id;
        repo.insert_playlist(never_synced).await;

        // Synced recently: not due.
        let mut recent = playlist(Uuid::new_v4());
        recent.last_synced_at = Some(now - Duration::hours(1));
        repo.insert_playlist(recent).await;

        // Stale: due.
        let mut stale = playlist(Uuid::new_v4());
        stale.last_synced_at = Some(now - Duration::hours(48));
        let stale_id = stale.id;
        repo.insert_playlist(stale).await;

        // Unlinked: never due.
        let mut unlinked = playlist(Uuid::new_v4());
        unlinked.remote_provider = None;
        unlinked.remote_id = None;
        repo.insert_playlist(unlinked).await;

        // Soft-deleted: never due.
        let mut deleted = playlist(Uuid::new_v4());
        deleted.deleted_at = Some(now);
        repo.insert_playlist(deleted).await;

        let mut due = repo.due_for_sync(cutoff).await.unwrap();
        due.sort_by_key(|id| id.to_string());
        let mut expected = vec![never_synced_id, stale_id];
        expected.sort_by_key(|id| id.to_string());
        assert_eq!(due, expected);
    }

    #[tokio::test]
    async fn test_purge_removes_only_old_soft_deletes() {
        let repo = MemoryPlaylistRepository::new();
        let now = Utc::now();

        let mut old = playlist(Uuid::new_v4());
        old.deleted_at = Some(now - Duration::days(40));
        repo.insert_playlist(old).await;

        let mut fresh = playlist(Uuid::new_v4());
        fresh.deleted_at = Some(now - Duration::days(5));
        let fresh_id = fresh.id;
        repo.insert_playlist(fresh).await;

        let live = playlist(Uuid::new_v4());
        let live_id = live.id;
        repo.insert_playlist(live).await;

        let purged = repo
            .purge_deleted_before(now - Duration::days(30))
            .await
            .unwrap();

        assert_eq!(purged, 1);
        assert!(repo.get(fresh_id).await.is_some());
        assert!(repo.get(live_id).await.is_some());
    }

    #[tokio::test]
    async fn test_find_with_connection_joins_owner_and_provider() {
        let repo = MemoryPlaylistRepository::new();
        let owner = Uuid::new_v4();

        let p = playlist(owner);
        let id = p.id;
        repo.insert_playlist(p).await;

        // Another user's connection must not be picked up.
        let other = ServiceConnection {
            id: core_auth::ConnectionId::new(),
            owner_id: Uuid::new_v4(),
            provider: ProviderKind::Spotify,
            external_user_id: "other".to_string(),
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: None,
            credentials_override: None,
            market: None,
        };
        repo.insert_connection(other).await;

        let bundle = repo.find_with_connection(id).await.unwrap().unwrap();
        assert!(bundle.connection.is_none());

        let own = ServiceConnection {
            id: core_auth::ConnectionId::new(),
            owner_id: owner,
            provider: ProviderKind::Spotify,
            external_user_id: "me".to_string(),
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: None,
            credentials_override: None,
            market: None,
        };
        repo.insert_connection(own).await;

        let bundle = repo.find_with_connection(id).await.unwrap().unwrap();
        assert!(bundle.connection.is_some());
    }
}
