//! # Spotify Catalog Connector
//!
//! Implements `bridge_traits::catalog::CatalogProvider` against the
//! Spotify Web API. Connectors are cheap, token-bearing values constructed
//! per use; obtain a valid token from `core-auth` first.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::SpotifyConnector;
pub use error::{Result, SpotifyError};
