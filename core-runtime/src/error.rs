//! Public Error Taxonomy
//!
//! A small closed set of error kinds that every crate-level error maps
//! onto at collaborator boundaries. Callers see a stable kind plus a
//! sanitized message; raw upstream error bodies are logged internally,
//! never surfaced.

use thiserror::Error;

/// Stable classification of failures, used at collaborator boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credential or token invalid. Never retried.
    Authentication,
    /// Upstream provider failure. Retried per policy, then surfaced.
    ExternalService,
    /// Malformed input. Never retried, surfaced immediately.
    Validation,
    /// Lock or store unavailable. Retried only at the lock's own policy.
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::ExternalService => "external_service",
            ErrorKind::Validation => "validation",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-safe message for an error kind.
///
/// Upstream error bodies may carry tokens, connection strings, or other
/// internals; only these fixed strings cross the boundary to end users.
pub fn sanitized_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Authentication => "Authentication with the provider failed",
        ErrorKind::ExternalService => "An upstream service is currently unavailable",
        ErrorKind::Validation => "The request was invalid",
        ErrorKind::Infrastructure => "A required backend component is unavailable",
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
