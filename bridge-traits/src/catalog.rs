//! Streaming Catalog Abstraction
//!
//! Defines the surface a streaming-catalog connector must implement:
//! track search, playlist creation, batched track addition, and
//! full-track-list replacement. Connector crates (e.g. `provider-spotify`)
//! implement this trait against a concrete Web API; the resolver and sync
//! engine consume it without knowing which catalog they talk to.

use async_trait::async_trait;

use crate::error::Result;

/// A track lookup issued against the catalog's search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    /// Requested artist name
    pub artist: String,
    /// Requested track title
    pub title: String,
    /// Album name, when the caller wants a narrow album-scoped search
    pub album: Option<String>,
}

impl TrackQuery {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// One search result considered for matching a requested track.
///
/// Owned transiently during scoring; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    /// Catalog-native identifier (e.g. a `spotify:track:...` URI)
    pub id: String,
    /// Track title as credited by the catalog
    pub title: String,
    /// Credited artists, in catalog order
    pub artists: Vec<String>,
    /// Album title
    pub album: String,
    /// Track duration in milliseconds, when the catalog reports it
    pub duration_ms: Option<u64>,
}

impl TrackCandidate {
    /// The primary credited artist, if any.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}

/// Options for playlist creation.
#[derive(Debug, Clone, Default)]
pub struct PlaylistOptions {
    pub description: String,
    pub public: bool,
}

/// Streaming catalog operations.
///
/// Connectors are constructed per use with an already-valid access token;
/// token lifecycle is the caller's concern.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::catalog::{CatalogProvider, TrackQuery};
///
/// async fn first_hit(catalog: &dyn CatalogProvider) -> Result<Option<String>> {
///     let query = TrackQuery::new("Target Artist", "Target Song");
///     let candidates = catalog.search_tracks(&query, 1).await?;
///     Ok(candidates.into_iter().next().map(|c| c.id))
/// }
/// ```
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search the catalog for tracks matching the query.
    ///
    /// Returns up to `limit` candidates; an empty vector is a valid
    /// "nothing matched" outcome, not an error.
    async fn search_tracks(&self, query: &TrackQuery, limit: u32) -> Result<Vec<TrackCandidate>>;

    /// Create a playlist for the authenticated user and return its
    /// catalog-native identifier.
    async fn create_playlist(&self, name: &str, opts: &PlaylistOptions) -> Result<String>;

    /// Append tracks to a playlist, chunking into provider-sized batches
    /// internally.
    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// Replace a playlist's entire track list with `track_ids`.
    ///
    /// The first batch replaces, remaining batches append. This is a full
    /// overwrite by contract; implementations must not diff against remote
    /// state.
    async fn replace_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// Maximum number of tracks the catalog accepts per add/replace call.
    fn batch_limit(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_query_builder() {
        let query = TrackQuery::new("Radiohead", "Exit Music").with_album("OK Computer");
        assert_eq!(query.artist, "Radiohead");
        assert_eq!(query.album.as_deref(), Some("OK Computer"));
    }

    #[test]
    fn test_primary_artist() {
        let candidate = TrackCandidate {
            id: "spotify:track:1".to_string(),
            title: "Song".to_string(),
            artists: vec!["First".to_string(), "Second".to_string()],
            album: "Album".to_string(),
            duration_ms: Some(180_000),
        };
        assert_eq!(candidate.primary_artist(), Some("First"));

        let orphan = TrackCandidate {
            id: "spotify:track:2".to_string(),
            title: "Song".to_string(),
            artists: vec![],
            album: "Album".to_string(),
            duration_ms: None,
        };
        assert_eq!(orphan.primary_artist(), None);
    }
}
