//! # Metadata Verification Chain
//!
//! Confirms a version claim ("this track exists as a live recording")
//! against sources independent of the catalog's own search relevance:
//! MusicBrainz first, Discogs as fallback.
//!
//! ## Protocol
//!
//! 1. Query MusicBrainz recordings. For tags with a keyword set (live,
//!    remix, remaster, compilation) the records' disambiguation/title text
//!    is scanned per record; first match confirms. For studio/unspecified
//!    requests, any record at all confirms: mere existence is sufficient
//!    for the default case.
//! 2. If the primary raises a transport error, a non-2xx status, or
//!    returns no usable match, the same tag-matching logic runs against a
//!    Discogs database search.
//! 3. Both sources exhausted without a match is a *negative verdict*, not
//!    an error. Callers must not treat it as a failure of the overall
//!    resolution.

use async_trait::async_trait;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::providers::{DiscogsClient, MusicBrainzClient};
use crate::version::VersionTag;

/// Which independent source confirmed a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationSource {
    MusicBrainz,
    Discogs,
}

impl fmt::Display for VerificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationSource::MusicBrainz => write!(f, "MusicBrainz"),
            VerificationSource::Discogs => write!(f, "Discogs"),
        }
    }
}

/// Outcome of a verification, with provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationVerdict {
    pub confirmed: bool,
    pub source: Option<VerificationSource>,
}

impl VerificationVerdict {
    pub fn confirmed_by(source: VerificationSource) -> Self {
        Self {
            confirmed: true,
            source: Some(source),
        }
    }

    pub fn negative() -> Self {
        Self {
            confirmed: false,
            source: None,
        }
    }
}

/// Confirms whether (artist, title, version) exists per an independent
/// metadata source.
#[async_trait]
pub trait VersionVerifier: Send + Sync {
    async fn verify(
        &self,
        artist: &str,
        title: &str,
        version: Option<VersionTag>,
    ) -> Result<VerificationVerdict>;
}

/// Primary → secondary verification chain.
pub struct MetadataVerifier {
    musicbrainz: MusicBrainzClient,
    discogs: Option<DiscogsClient>,
}

impl MetadataVerifier {
    /// Chain with MusicBrainz only; Discogs fallback disabled.
    pub fn new(musicbrainz: MusicBrainzClient) -> Self {
        Self {
            musicbrainz,
            discogs: None,
        }
    }

    /// Enable the Discogs fallback.
    pub fn with_discogs(mut self, discogs: DiscogsClient) -> Self {
        self.discogs = Some(discogs);
        self
    }

    /// Whether any record's text satisfies the requested tag.
    ///
    /// Tags without a keyword set (studio, original, instrumental,
    /// acoustic) are satisfied by existence alone.
    fn any_match(requested: Option<VersionTag>, mut texts: impl Iterator<Item = String>) -> bool {
        let tag = requested.unwrap_or(VersionTag::Studio);
        match tag.keywords() {
            Some(_) => texts.any(|text| tag.matches_text(&text)),
            None => texts.next().is_some(),
        }
    }
}

#[async_trait]
impl VersionVerifier for MetadataVerifier {
    #[instrument(skip(self), fields(artist = %artist, title = %title))]
    async fn verify(
        &self,
        artist: &str,
        title: &str,
        version: Option<VersionTag>,
    ) -> Result<VerificationVerdict> {
        match self.musicbrainz.search_recordings(artist, title).await {
            Ok(recordings) => {
                if Self::any_match(version, recordings.iter().map(|r| r.descriptive_text())) {
                    debug!("Claim confirmed by MusicBrainz");
                    return Ok(VerificationVerdict::confirmed_by(
                        VerificationSource::MusicBrainz,
                    ));
                }
                debug!("No usable MusicBrainz match, trying fallback");
            }
            Err(e) => {
                warn!(error = %e, "MusicBrainz verification failed, falling back to Discogs");
            }
        }

        if let Some(discogs) = &self.discogs {
            match discogs.search(artist, title).await {
                Ok(records) => {
                    if Self::any_match(version, records.iter().map(|r| r.title.clone())) {
                        debug!("Claim confirmed by Discogs");
                        return Ok(VerificationVerdict::confirmed_by(
                            VerificationSource::Discogs,
                        ));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Discogs verification failed");
                }
            }
        }

        Ok(VerificationVerdict::negative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_match_keyword_tags() {
        let texts = vec!["Song studio take".to_string(), "Song (Live) 1994".to_string()];
        assert!(MetadataVerifier::any_match(
            Some(VersionTag::Live),
            texts.clone().into_iter()
        ));
        assert!(!MetadataVerifier::any_match(
            Some(VersionTag::Remaster),
            texts.into_iter()
        ));
    }

    #[test]
    fn test_any_match_existence_tags() {
        let texts = vec!["anything".to_string()];
        assert!(MetadataVerifier::any_match(None, texts.clone().into_iter()));
        assert!(MetadataVerifier::any_match(
            Some(VersionTag::Studio),
            texts.into_iter()
        ));
        assert!(!MetadataVerifier::any_match(None, std::iter::empty()));
    }

    #[test]
    fn test_verdict_constructors() {
        let positive = VerificationVerdict::confirmed_by(VerificationSource::Discogs);
        assert!(positive.confirmed);
        assert_eq!(positive.source, Some(VerificationSource::Discogs));

        let negative = VerificationVerdict::negative();
        assert!(!negative.confirmed);
        assert!(negative.source.is_none());
    }
}
