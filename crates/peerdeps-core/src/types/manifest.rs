//! Package manifest types.
//!
//! Mirrors the subset of package.json the validator reads. Maps keep the
//! declaration order of the file so diagnostics list entries as written.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Package manifest (package.json)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Package name
    #[serde(default)]
    pub name: String,

    /// Package version, kept verbatim
    #[serde(default)]
    pub version: String,

    /// Runtime dependencies
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development dependencies
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,

    /// Dependencies the consumer is expected to provide
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,

    /// Extra metadata per peer dependency
    #[serde(default)]
    pub peer_dependencies_meta: IndexMap<String, PeerDependencyMeta>,
}

/// Entry of `peerDependenciesMeta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerDependencyMeta {
    #[serde(default)]
    pub optional: bool,
}

impl Manifest {
    /// Create a manifest with a name and version and no dependencies
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Add a runtime dependency
    pub fn with_dependency(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dependencies.insert(name.into(), range.into());
        self
    }

    /// Add a development dependency
    pub fn with_dev_dependency(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dev_dependencies.insert(name.into(), range.into());
        self
    }

    /// Add a peer dependency
    pub fn with_peer_dependency(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.peer_dependencies.insert(name.into(), range.into());
        self
    }

    /// Mark a peer dependency as optional
    pub fn with_optional_peer(mut self, name: impl Into<String>) -> Self {
        self.peer_dependencies_meta
            .insert(name.into(), PeerDependencyMeta { optional: true });
        self
    }

    /// Whether `peerDependenciesMeta` marks `name` optional
    pub fn is_optional_peer(&self, name: &str) -> bool {
        self.peer_dependencies_meta
            .get(name)
            .map_or(false, |meta| meta.optional)
    }

    /// Names declared both in `dependencies` and `peerDependencies`, in peer
    /// declaration order
    pub fn conflicting_peer_dependencies(&self) -> Vec<String> {
        self.peer_dependencies
            .keys()
            .filter(|name| self.dependencies.contains_key(*name))
            .cloned()
            .collect()
    }
}
