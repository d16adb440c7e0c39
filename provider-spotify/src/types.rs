//! Spotify Web API response types

use serde::Deserialize;

/// Search response envelope
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: TracksPage,
}

/// One page of track results
#[derive(Debug, Deserialize)]
pub struct TracksPage {
    #[serde(default)]
    pub items: Vec<TrackObject>,
}

/// A full track object
#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
    pub album: AlbumObject,
}

/// A simplified artist object
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    pub name: String,
}

/// A simplified album object
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumObject {
    pub name: String,
}

/// Response to playlist creation
#[derive(Debug, Deserialize)]
pub struct PlaylistCreateResponse {
    pub id: String,
}

/// Error envelope returned by the Spotify API
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "tracks": {
                "items": [
                    {
                        "uri": "spotify:track:abc123",
                        "name": "Target Song",
                        "duration_ms": 215000,
                        "artists": [{"name": "Target Artist"}, {"name": "Featured Artist"}],
                        "album": {"name": "The Album"}
                    }
                ]
            }
        }"#;

        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tracks.items.len(), 1);
        let track = &parsed.tracks.items[0];
        assert_eq!(track.uri, "spotify:track:abc123");
        assert_eq!(track.artists.len(), 2);
        assert_eq!(track.album.name, "The Album");
    }

    #[test]
    fn test_error_response_parsing() {
        let json = r#"{"error": {"status": 429, "message": "API rate limit exceeded"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.status, 429);
        assert!(parsed.error.message.contains("rate limit"));
    }
}
