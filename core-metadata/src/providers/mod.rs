//! Independent metadata source clients.

pub mod discogs;
pub mod musicbrainz;

pub use discogs::{DiscogsClient, DiscogsRecord};
pub use musicbrainz::{MusicBrainzClient, Recording};
