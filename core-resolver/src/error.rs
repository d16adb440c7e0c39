use core_runtime::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl ResolverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolverError::Catalog(_) => ErrorKind::ExternalService,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
