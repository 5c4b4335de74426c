//! Core data types for peer dependency validation.
//!
//! This module provides the fundamental types used throughout peerdeps:
//! - Version types with npm range semantics
//! - The package manifest model
//! - Validation outcomes (satisfied, or a structured failure)

pub mod manifest;
pub mod outcome;
pub mod version;

// Re-export all public types
pub use manifest::{Manifest, PeerDependencyMeta};
pub use outcome::{Failure, IncompatibleRange, MissingPeerDependency, ValidationResult};
pub use version::{
    satisfies, Comparator, ComparatorSet, Op, PartialVersion, Version, VersionError, VersionReq,
};
