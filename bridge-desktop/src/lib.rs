//! # Desktop Bridge Implementations
//!
//! Concrete implementations of the `bridge-traits` collaborator seams for
//! desktop/server deployments:
//!
//! - [`ReqwestHttpClient`] - HTTP transport over reqwest with pooling,
//!   TLS, and transport-level retry
//! - [`MemoryKeyValueStore`] - expiry-honoring in-process key-value store
//!   with SET-NX-EX semantics

pub mod http;
pub mod kv;

pub use http::ReqwestHttpClient;
pub use kv::MemoryKeyValueStore;
