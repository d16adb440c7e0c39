use core_runtime::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("No refresh token available for connection")]
    NoRefreshToken,

    #[error("No client credentials configured for provider {0}")]
    MissingClientCredentials(String),

    #[error("Token endpoint unreachable: {0}")]
    Network(String),

    #[error("Connection store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Map onto the public error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::TokenRefreshFailed(_)
            | AuthError::NoRefreshToken
            | AuthError::MissingClientCredentials(_) => ErrorKind::Authentication,
            AuthError::Network(_) => ErrorKind::ExternalService,
            AuthError::Store(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
