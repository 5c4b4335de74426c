//! Error types and result aliases for peerdeps operations.
//!
//! Provides a unified error type that covers every condition the validator
//! can surface, each with an actionable message.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::types::{Failure, VersionError};

/// Unified error type for all peerdeps operations
#[derive(Error, Debug)]
pub enum PeerError {
    // Discovery errors
    #[error("could not find a package.json when resolving upwards from:\n\t{root}")]
    ManifestNotFound { root: Utf8PathBuf },

    #[error("Failed to parse {path}: {message}")]
    JsonParse { path: Utf8PathBuf, message: String },

    // Authoring errors
    #[error(
        "{package} (at `{location}`) is improperly configured:\n{}",
        render_conflicts(.names)
    )]
    DependencyConflict {
        package: String,
        location: String,
        names: Vec<String>,
    },

    // Validation errors
    #[error("{failure}")]
    UnmetPeerDependencies { failure: Box<Failure> },

    #[error("Cannot assume a peer dependency is provided without {}", .missing.join(" and "))]
    InvalidAssumption { missing: Vec<&'static str> },

    #[error(transparent)]
    Version(#[from] VersionError),

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for peerdeps operations
pub type PeerResult<T> = Result<T, PeerError>;

fn render_conflicts(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\n\t* {name}: included both as dependency and as a peer dependency"))
        .collect()
}

impl PeerError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Wrap a failed validation so it can be raised
    pub fn unmet(failure: Failure) -> Self {
        Self::UnmetPeerDependencies {
            failure: Box::new(failure),
        }
    }

    /// The structured failure, if this error carries one
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            PeerError::UnmetPeerDependencies { failure } => Some(failure),
            _ => None,
        }
    }

    /// Whether the error reflects the state of the dependency tree (as opposed
    /// to a bad call or an unreadable file)
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            PeerError::UnmetPeerDependencies { .. }
                | PeerError::DependencyConflict { .. }
                | PeerError::ManifestNotFound { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PeerError::ManifestNotFound { .. } => {
                Some("Point the check at a directory inside a package (one containing package.json)")
            },
            PeerError::DependencyConflict { .. } => {
                Some("Remove the entry from either dependencies or peerDependencies")
            },
            PeerError::UnmetPeerDependencies { .. } => {
                Some("Install the listed packages at a version within the declared range")
            },
            PeerError::InvalidAssumption { .. } => {
                Some("Pass both a package name and a concrete version, e.g. foo@1.2.3")
            },
            PeerError::JsonParse { .. } => Some("Fix the JSON syntax in the named package.json"),
            _ => None,
        }
    }
}
