//! Task Dispatch Abstraction
//!
//! A fire-and-forget enqueue for background sync runs. The scheduler calls
//! it and never awaits completion; the queue transport behind it (broker,
//! in-process spawner, ...) is the host's choice.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Fire-and-forget dispatch of per-playlist sync runs.
///
/// `dispatch_sync` returns as soon as the run is enqueued. Failures to
/// *enqueue* are reported; failures of the run itself are handled entirely
/// by the run and are invisible here.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Enqueue one synchronization run for the given playlist.
    async fn dispatch_sync(&self, playlist_id: Uuid) -> Result<()>;
}
