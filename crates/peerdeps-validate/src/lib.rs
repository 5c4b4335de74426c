//! Peer dependency validation for peerdeps
//!
//! This crate checks that the peer dependencies a package declares are
//! installed at versions inside the declared ranges. Results are memoized
//! per root, and a process-wide assumption table can stand in for installed
//! packages.
//!
//! The free functions operate on one lazily created process-wide
//! `Validator`. Tests and embedders that need isolation create their own
//! with `Validator::new()` or `Validator::with_parts`.

pub mod assumptions;
pub mod cache;
pub mod engine;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use assumptions::{Assumption, AssumptionRegistry};
pub use cache::{cache_key, CacheMode, CacheView, MemoryStore, NullStore, ResultStore};
pub use engine::{ValidateOptions, Validator};
pub use report::{format_failure, FailureHandler, RaiseOnFailure};

use camino::Utf8Path;
use once_cell::sync::Lazy;
use peerdeps_core::error::PeerResult;

static GLOBAL: Lazy<Validator> = Lazy::new(Validator::new);

/// The process-wide validator behind the free functions
pub fn global() -> &'static Validator {
    &GLOBAL
}

/// Validate the package enclosing `root` with the process-wide validator
pub fn validate_peer_dependencies(root: impl AsRef<Utf8Path>, options: ValidateOptions<'_>) -> PeerResult<()> {
    GLOBAL.validate(root, options)
}

/// Treat `name` as installed at `version` in every later validation
pub fn assume_provided(name: impl Into<String>, version: impl Into<String>) -> PeerResult<()> {
    GLOBAL.assume_provided(name, version)
}

/// Clear the process-wide result store and lookup memo
pub fn reset_cache() {
    GLOBAL.reset_cache();
}

/// Forget every process-wide assumption
pub fn reset_assumptions() {
    GLOBAL.reset_assumptions();
}

/// Read-only view of the process-wide result store
pub fn default_cache() -> CacheView<'static> {
    GLOBAL.cache()
}
