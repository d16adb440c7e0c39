//! # Runtime Infrastructure
//!
//! Ambient concerns shared by every domain crate:
//!
//! - **Configuration** ([`config::Settings`]) - environment-driven settings
//!   with documented defaults
//! - **Logging** ([`logging::init_logging`]) - tracing-subscriber setup
//!   with EnvFilter and selectable output format
//! - **Retry** ([`retry::retry_with_policy`]) - bounded, cancellation-aware
//!   retry parameterized by a retryability predicate
//! - **Error taxonomy** ([`error::ErrorKind`]) - the stable public
//!   classification of failures plus sanitized user-facing messages

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;

pub use config::Settings;
pub use error::{sanitized_message, ErrorKind};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use retry::retry_with_policy;
