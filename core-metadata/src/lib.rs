//! # Metadata & Verification
//!
//! Version-tag modeling and independent verification of version claims.
//!
//! ## Components
//!
//! - **Version tags** ([`version`]): the classification of a recording's
//!   character and the pure inference rule mapping title/album text onto it
//! - **Rate limiter** ([`rate_limit`]): per-client minimum-interval gate
//!   for the metadata sources' request spacing rules
//! - **Provider clients** ([`providers`]): MusicBrainz recording search and
//!   Discogs database search
//! - **Verification chain** ([`verifier`]): primary → secondary fallback
//!   that turns "does this live/remix/remaster exist" into a verdict with
//!   provenance

pub mod error;
pub mod providers;
pub mod rate_limit;
pub mod verifier;
pub mod version;

pub use error::{MetadataError, Result};
pub use providers::{DiscogsClient, DiscogsRecord, MusicBrainzClient, Recording};
pub use rate_limit::RateLimiter;
pub use verifier::{
    MetadataVerifier, VerificationSource, VerificationVerdict, VersionVerifier,
};
pub use version::{infer_version, VersionTag};
