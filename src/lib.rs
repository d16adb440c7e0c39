//! Workspace placeholder crate.
//!
//! This crate exists only to anchor the workspace. Host applications depend
//! on the individual crates (`core-resolver`, `core-sync`, `core-auth`,
//! `core-metadata`, `provider-spotify`) directly and wire the bridge
//! implementations they need.
