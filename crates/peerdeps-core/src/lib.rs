//! # peerdeps-core
//!
//! Core types and utilities shared across all peerdeps crates.
//!
//! This crate provides:
//! - `Version` and `VersionReq` with npm range semantics (prereleases included)
//! - The package manifest model and validation outcome types
//! - `PeerError` enum for unified error handling
//! - Path helpers used when rendering diagnostics
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Manifest, ValidationResult, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{PeerError, PeerResult};
pub use types::{
    satisfies, Failure, IncompatibleRange, Manifest, MissingPeerDependency, PeerDependencyMeta,
    ValidationResult, Version, VersionError, VersionReq,
};
