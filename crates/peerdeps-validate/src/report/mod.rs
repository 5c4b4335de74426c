//! Failure reporting.
//!
//! A `FailureHandler` receives every unmet validation, fresh or cached. The
//! default handler turns it into `PeerError::UnmetPeerDependencies`; callers
//! that want the structured data pass their own.

use camino::{Utf8Path, Utf8PathBuf};
use peerdeps_core::error::{PeerError, PeerResult};
use peerdeps_core::types::{Failure, Manifest};
use peerdeps_core::utils::relative_location;

/// Sink for unmet peer dependencies
pub trait FailureHandler {
    fn handle(&self, failure: &Failure) -> PeerResult<()>;
}

impl<F> FailureHandler for F
where
    F: Fn(&Failure) -> PeerResult<()>,
{
    fn handle(&self, failure: &Failure) -> PeerResult<()> {
        self(failure)
    }
}

/// Default handler: fail the call with the formatted message
#[derive(Debug, Clone, Copy, Default)]
pub struct RaiseOnFailure;

impl FailureHandler for RaiseOnFailure {
    fn handle(&self, failure: &Failure) -> PeerResult<()> {
        Err(PeerError::unmet(failure.clone()))
    }
}

/// Human-readable report for a failure
pub fn format_failure(failure: &Failure) -> String {
    failure.to_string()
}

/// One-line summary for log output
pub fn summarize(failure: &Failure) -> String {
    format!(
        "{}: {} missing, {} incompatible",
        failure.pkg.name,
        failure.missing().len(),
        failure.incompatible().len()
    )
}

/// Error for a manifest listing names both as dependency and peer dependency.
///
/// The location is the package directory relative to the working directory.
pub fn dependency_conflict(pkg: &Manifest, package_path: &Utf8Path, names: Vec<String>) -> PeerError {
    let dir = package_path.parent().unwrap_or(package_path);
    let location = match current_dir() {
        Some(cwd) => relative_location(dir, &cwd),
        None => dir.to_string(),
    };

    PeerError::DependencyConflict {
        package: pkg.name.clone(),
        location,
        names,
    }
}

fn current_dir() -> Option<Utf8PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    Utf8PathBuf::from_path_buf(cwd).ok()
}
