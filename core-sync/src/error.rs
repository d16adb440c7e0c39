use core_runtime::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to acquire lock {name}: already held")]
    LockContention { name: String },

    #[error("Lock store unreachable: {0}")]
    LockUnavailable(String),

    #[error("Lock acquisition timed out for {name} after {waited_ms}ms")]
    LockTimeout { name: String, waited_ms: u128 },

    #[error("Playlist {0} not found")]
    PlaylistNotFound(Uuid),

    #[error("Playlist {0} is not linked to a remote provider")]
    NotLinked(Uuid),

    #[error("Provider {0} is not supported by this engine")]
    UnsupportedProvider(String),

    #[error("User {owner_id} has no active {provider} connection")]
    NoConnection { owner_id: Uuid, provider: String },

    #[error("Token error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

impl SyncError {
    /// Map onto the public error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::LockContention { .. }
            | SyncError::LockUnavailable(_)
            | SyncError::LockTimeout { .. }
            | SyncError::Repository(_)
            | SyncError::Dispatch(_) => ErrorKind::Infrastructure,
            SyncError::PlaylistNotFound(_)
            | SyncError::NotLinked(_)
            | SyncError::UnsupportedProvider(_)
            | SyncError::NoConnection { .. } => ErrorKind::Validation,
            SyncError::Auth(e) => e.kind(),
            SyncError::Catalog(_) => ErrorKind::ExternalService,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
