//! # Track Resolver
//!
//! Resolves an informally-specified track ("Artist – Title", optionally
//! album/version) to a catalog-native identifier by scoring search
//! candidates.
//!
//! ## Scoring
//!
//! A candidate's score is built from three weighted terms plus an optional
//! boost, out of a possible 130:
//!
//! - artist similarity × 30 (best ratio across credited artists)
//! - title similarity × 40
//! - version/album term, worth up to 30: album similarity when an album was
//!   requested, otherwise how well the candidate's inferred version tag
//!   matches the requested one
//! - external verification boost of 20 for live/remix/remaster requests
//!   confirmed by the verification chain (best effort: a failed
//!   verification contributes zero, never aborts scoring)
//!
//! The best candidate is accepted only above 60 points. Below that, a
//! wrong song is judged worse than a missed match, so the resolution
//! reports not-found instead.

use bridge_traits::catalog::{CatalogProvider, PlaylistOptions, TrackCandidate, TrackQuery};
use core_metadata::{infer_version, VersionTag, VersionVerifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{ResolverError, Result};
use crate::similarity::ratio;

const ARTIST_WEIGHT: f64 = 30.0;
const TITLE_WEIGHT: f64 = 40.0;
const ALBUM_WEIGHT: f64 = 30.0;
const VERIFICATION_BOOST: f64 = 20.0;

/// Minimum score a candidate must exceed to be accepted.
const ACCEPT_THRESHOLD: f64 = 60.0;

/// Result limit for the broad artist+title search.
const BROAD_SEARCH_LIMIT: u32 = 20;

/// An informally-specified track to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub artist: String,
    pub title: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub version: Option<VersionTag>,
}

impl ResolutionRequest {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
            version: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_version(mut self, version: VersionTag) -> Self {
        self.version = Some(version);
        self
    }
}

/// Outcome of resolving a batch of requests.
///
/// Partial success is the norm: unresolved tracks are reported, never
/// allowed to abort the batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Catalog identifiers of the accepted matches, in request order
    pub resolved: Vec<String>,
    /// Requests that could not be resolved
    pub failed: Vec<ResolutionRequest>,
}

/// Report of a resolve-and-build playlist operation.
#[derive(Debug)]
pub struct PlaylistBuildReport {
    pub playlist_id: String,
    pub resolved: Vec<String>,
    pub failed: Vec<ResolutionRequest>,
}

/// Scores catalog search candidates against resolution requests.
pub struct TrackResolver {
    verifier: Option<Arc<dyn VersionVerifier>>,
}

impl TrackResolver {
    /// Resolver without external verification; the boost term is always
    /// zero.
    pub fn new() -> Self {
        Self { verifier: None }
    }

    /// Enable the external-verification boost.
    pub fn with_verifier(mut self, verifier: Arc<dyn VersionVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Resolve one request to a catalog identifier.
    ///
    /// Returns `Ok(None)` when nothing scores above the acceptance
    /// threshold.
    #[instrument(skip(self, catalog), fields(artist = %request.artist, title = %request.title))]
    pub async fn resolve(
        &self,
        catalog: &dyn CatalogProvider,
        request: &ResolutionRequest,
    ) -> Result<Option<String>> {
        // An exact album hit short-circuits scoring entirely.
        if let Some(album) = &request.album {
            let query = TrackQuery::new(&request.artist, &request.title).with_album(album);
            let hits = catalog
                .search_tracks(&query, 1)
                .await
                .map_err(|e| ResolverError::Catalog(e.to_string()))?;
            if let Some(hit) = hits.into_iter().next() {
                debug!(id = %hit.id, "Narrow album search hit");
                return Ok(Some(hit.id));
            }
        }

        let query = TrackQuery::new(&request.artist, &request.title);
        let candidates = catalog
            .search_tracks(&query, BROAD_SEARCH_LIMIT)
            .await
            .map_err(|e| ResolverError::Catalog(e.to_string()))?;

        if candidates.is_empty() {
            return Ok(None);
        }

        let mut best: Option<(f64, TrackCandidate)> = None;
        for candidate in candidates {
            let mut score = self.base_score(request, &candidate);
            score += self.verification_boost(request, &candidate).await;

            debug!(id = %candidate.id, score = score, "Scored candidate");
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, candidate)) if score > ACCEPT_THRESHOLD => {
                info!(id = %candidate.id, score = score, "Resolved track");
                Ok(Some(candidate.id))
            }
            Some((score, _)) => {
                info!(score = score, "Best candidate below acceptance threshold");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn base_score(&self, request: &ResolutionRequest, candidate: &TrackCandidate) -> f64 {
        let artist_match = candidate
            .artists
            .iter()
            .map(|a| ratio(&request.artist, a))
            .fold(0.0, f64::max);

        let mut score = artist_match * ARTIST_WEIGHT;
        score += ratio(&request.title, &candidate.title) * TITLE_WEIGHT;

        score += match &request.album {
            Some(album) => ratio(album, &candidate.album) * ALBUM_WEIGHT,
            None => {
                let inferred = infer_version(&candidate.title, &candidate.album);
                version_term(request.version, inferred)
            }
        };

        score
    }

    /// Best-effort external verification boost for live/remix/remaster
    /// requests.
    async fn verification_boost(
        &self,
        request: &ResolutionRequest,
        candidate: &TrackCandidate,
    ) -> f64 {
        let Some(verifier) = &self.verifier else {
            return 0.0;
        };
        let Some(tag) = request.version else {
            return 0.0;
        };
        if !matches!(
            tag,
            VersionTag::Live | VersionTag::Remix | VersionTag::Remaster
        ) {
            return 0.0;
        }

        let artist = candidate.primary_artist().unwrap_or(&request.artist);
        match verifier.verify(artist, &candidate.title, Some(tag)).await {
            Ok(verdict) if verdict.confirmed => VERIFICATION_BOOST,
            Ok(_) => 0.0,
            Err(e) => {
                debug!(error = %e, "Metadata verification skipped");
                0.0
            }
        }
    }

    /// Resolve a batch of requests, continuing past unresolved tracks.
    pub async fn resolve_all(
        &self,
        catalog: &dyn CatalogProvider,
        requests: &[ResolutionRequest],
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for request in requests {
            match self.resolve(catalog, request).await {
                Ok(Some(id)) => outcome.resolved.push(id),
                Ok(None) => {
                    info!(artist = %request.artist, title = %request.title, "Track not found");
                    outcome.failed.push(request.clone());
                }
                Err(e) => {
                    warn!(artist = %request.artist, title = %request.title, error = %e, "Resolution failed");
                    outcome.failed.push(request.clone());
                }
            }
        }

        outcome
    }

    /// Resolve a batch of requests, create a playlist, and add the
    /// accepted identifiers in provider-sized batches.
    #[instrument(skip(self, catalog, requests), fields(name = %name, count = requests.len()))]
    pub async fn build_playlist(
        &self,
        catalog: &dyn CatalogProvider,
        name: &str,
        opts: &PlaylistOptions,
        requests: &[ResolutionRequest],
    ) -> Result<PlaylistBuildReport> {
        let outcome = self.resolve_all(catalog, requests).await;

        let playlist_id = catalog
            .create_playlist(name, opts)
            .await
            .map_err(|e| ResolverError::Catalog(e.to_string()))?;

        for chunk in outcome.resolved.chunks(catalog.batch_limit()) {
            catalog
                .add_tracks(&playlist_id, chunk)
                .await
                .map_err(|e| ResolverError::Catalog(e.to_string()))?;
        }

        info!(
            playlist_id = %playlist_id,
            resolved = outcome.resolved.len(),
            failed = outcome.failed.len(),
            "Playlist built"
        );

        Ok(PlaylistBuildReport {
            playlist_id,
            resolved: outcome.resolved,
            failed: outcome.failed,
        })
    }
}

impl Default for TrackResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn version_term(requested: Option<VersionTag>, inferred: VersionTag) -> f64 {
    match requested {
        // Unspecified: prefer clean studio takes; a remaster still beats
        // live/remix cuts.
        None => match inferred {
            VersionTag::Studio => 30.0,
            VersionTag::Remaster => 20.0,
            _ => 10.0,
        },
        Some(VersionTag::Studio) | Some(VersionTag::Original) => match inferred {
            VersionTag::Studio => 30.0,
            VersionTag::Remaster => 20.0,
            _ => 5.0,
        },
        Some(tag) => {
            if inferred == tag {
                30.0
            } else {
                5.0
            }
        }
    }
}
