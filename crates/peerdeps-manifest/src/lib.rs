//! Manifest loading and module lookup for peerdeps
//!
//! This crate reads package.json files into `Manifest` values and maps
//! package names to the manifest node would load for them, so the
//! validation engine never touches the filesystem directly.

pub mod json;
pub mod lookup;

// Re-export main types
pub use json::{load_manifest, parse_manifest, JsonManifestLoader, ManifestLoader};
pub use lookup::{ModuleResolver, NodeModulesResolver, MANIFEST_FILE};

use peerdeps_core::error::PeerError;

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, PeerError>;
