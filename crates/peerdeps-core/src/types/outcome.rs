//! Validation outcome types.
//!
//! A validation either succeeds outright or yields a `Failure` describing
//! which peer dependencies are missing and which resolved out of range.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Manifest;

/// Declared peer dependency with no installed package behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPeerDependency {
    pub name: String,
    pub specified_peer_dependency_range: String,
}

/// Peer dependency that resolved to a version outside the declared range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompatibleRange {
    pub name: String,
    pub specified_peer_dependency_range: String,
    pub version: String,
}

/// Unmet peer dependencies of one package.
///
/// Each list is `None` rather than empty when it has no entries, and at
/// least one of the two is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub pkg: Manifest,
    pub package_path: Utf8PathBuf,
    pub missing_peer_dependencies: Option<Vec<MissingPeerDependency>>,
    pub incompatible_ranges: Option<Vec<IncompatibleRange>>,
}

/// Outcome of validating one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ValidationResult {
    Satisfied,
    Unmet(Failure),
}

impl ValidationResult {
    /// Build the outcome from the accumulated findings
    pub fn from_findings(
        pkg: Manifest,
        package_path: Utf8PathBuf,
        missing: Vec<MissingPeerDependency>,
        incompatible: Vec<IncompatibleRange>,
    ) -> Self {
        if missing.is_empty() && incompatible.is_empty() {
            return Self::Satisfied;
        }

        Self::Unmet(Failure {
            pkg,
            package_path,
            missing_peer_dependencies: Some(missing).filter(|list| !list.is_empty()),
            incompatible_ranges: Some(incompatible).filter(|list| !list.is_empty()),
        })
    }

    /// Check if every peer dependency was satisfied
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }

    /// The failure, if validation did not succeed
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Satisfied => None,
            Self::Unmet(failure) => Some(failure),
        }
    }
}

impl Failure {
    /// Missing peer dependencies, empty when none
    pub fn missing(&self) -> &[MissingPeerDependency] {
        self.missing_peer_dependencies.as_deref().unwrap_or_default()
    }

    /// Out-of-range peer dependencies, empty when none
    pub fn incompatible(&self) -> &[IncompatibleRange] {
        self.incompatible_ranges.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} has the following unmet peerDependencies:", self.pkg.name)?;

        for entry in self.missing() {
            write!(
                f,
                "\n\t* {}: `{}`; it was not installed",
                entry.name, entry.specified_peer_dependency_range
            )?;
        }

        for entry in self.incompatible() {
            write!(
                f,
                "\n\t* {}: `{}`; it was resolved to `{}`",
                entry.name, entry.specified_peer_dependency_range, entry.version
            )?;
        }

        Ok(())
    }
}
