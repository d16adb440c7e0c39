//! # Playlist Synchronization
//!
//! Keeps locally-stored playlists' remote representations in step with
//! their local state.
//!
//! ## Components
//!
//! - **Distributed lock** (`lock`): named, expiry-backed mutex over the
//!   shared key-value store, serializing runs per playlist
//! - **Repository** (`repository`): playlist model and the persistence
//!   queries the engine and scheduler need
//! - **Connector factory** (`connectors`): builds authenticated catalog
//!   connectors per run
//! - **Sync engine** (`engine`): the guarded full-replace reconciliation
//!   run and its state machine
//! - **Scheduler** (`scheduler`): periodic due-playlist dispatch plus the
//!   soft-delete purge companion

pub mod connectors;
pub mod engine;
pub mod error;
pub mod lock;
pub mod repository;
pub mod scheduler;

pub use connectors::{ConnectorFactory, SpotifyConnectorFactory};
pub use engine::{SyncEngine, SyncFailure, SyncReport, SyncStatus};
pub use error::{Result, SyncError};
pub use lock::SyncLock;
pub use repository::{
    LocalTrackRef, MemoryPlaylistRepository, Playlist, PlaylistId, PlaylistRepository, SyncBundle,
};
pub use scheduler::SyncScheduler;
