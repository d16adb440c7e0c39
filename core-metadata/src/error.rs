use core_runtime::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Metadata source returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Metadata source {provider} rejected credentials ({status})")]
    Unauthorized { provider: String, status: u16 },

    #[error("Rate limited by {provider}, retry after {retry_after_seconds}s")]
    RateLimited {
        provider: String,
        retry_after_seconds: u64,
    },

    #[error("Failed to parse metadata response: {0}")]
    JsonParse(String),
}

impl MetadataError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Credential rejections never self-heal and parse failures are
    /// deterministic; everything else is worth the bounded retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            MetadataError::Network(_)
            | MetadataError::HttpStatus { .. }
            | MetadataError::RateLimited { .. } => true,
            MetadataError::Unauthorized { .. } | MetadataError::JsonParse(_) => false,
        }
    }

    /// Map onto the public error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetadataError::Unauthorized { .. } => ErrorKind::Authentication,
            _ => ErrorKind::ExternalService,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;
