//! # Collaborator Bridge Traits
//!
//! Abstractions over every external collaborator the core crates talk to.
//!
//! ## Overview
//!
//! This crate defines the contract between the domain crates and their
//! infrastructure: HTTP transport, the shared key-value store backing the
//! distributed lock, the streaming catalog, background task dispatch, and
//! an injectable time source. Each trait represents a capability the core
//! requires but whose concrete implementation is a deployment decision.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with bounded timeouts
//! - [`KeyValueStore`](kv::KeyValueStore) - Atomic set-if-absent-with-expiry + delete
//! - [`CatalogProvider`](catalog::CatalogProvider) - Streaming catalog search and playlist operations
//! - [`TaskDispatcher`](dispatch::TaskDispatcher) - Fire-and-forget sync run enqueue
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert infrastructure-specific errors into it and keep messages
//! actionable; domain crates wrap it into their own typed errors.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; implementations are shared across
//! async tasks behind `Arc`.

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod kv;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{CatalogProvider, PlaylistOptions, TrackCandidate, TrackQuery};
pub use dispatch::TaskDispatcher;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use kv::KeyValueStore;
pub use time::{Clock, SystemClock};
