//! # Track Resolution
//!
//! Multi-criteria fuzzy matching of informally-specified tracks onto
//! catalog identifiers:
//!
//! - [`similarity`] - case-insensitive string similarity ratio
//! - [`TrackResolver`] - narrow/broad search orchestration, weighted
//!   candidate scoring with an optional external-verification boost, and
//!   batch resolution with partial-success reporting

pub mod error;
pub mod resolver;
pub mod similarity;

pub use error::{ResolverError, Result};
pub use resolver::{
    BatchOutcome, PlaylistBuildReport, ResolutionRequest, TrackResolver,
};
