//! Assumed peer dependencies.
//!
//! An assumption stands in for an installed package: when the engine meets a
//! peer dependency with an assumed version it checks that version against the
//! declared range and never looks on disk.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use peerdeps_core::error::{PeerError, PeerResult};

/// A peer dependency treated as provided at `version`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assumption {
    pub name: String,
    pub version: String,
}

impl Assumption {
    /// Build an assumption, rejecting empty fields
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> PeerResult<Self> {
        let assumption = Self {
            name: name.into(),
            version: version.into(),
        };
        assumption.check()?;
        Ok(assumption)
    }

    fn check(&self) -> PeerResult<()> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.version.trim().is_empty() {
            missing.push("version");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PeerError::InvalidAssumption { missing })
        }
    }
}

/// Parses `name@version`; scoped names keep their leading `@`
impl FromStr for Assumption {
    type Err = PeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.rfind('@') {
            Some(at) if at > 0 => Self::new(&s[..at], &s[at + 1..]),
            _ => Self::new(s, ""),
        }
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Name → assumed version table, last write wins
#[derive(Debug, Default)]
pub struct AssumptionRegistry {
    versions: RwLock<HashMap<String, String>>,
}

impl AssumptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an assumption, replacing any earlier one for the same name
    pub fn assume(&self, assumption: Assumption) -> PeerResult<()> {
        assumption.check()?;
        self.versions
            .write()
            .insert(assumption.name, assumption.version);
        Ok(())
    }

    /// Assumed version for `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.versions.read().get(name).cloned()
    }

    /// Forget every assumption
    pub fn reset(&self) {
        self.versions.write().clear();
    }

    pub fn len(&self) -> usize {
        self.versions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.read().is_empty()
    }

    /// Current assumptions sorted by name
    pub fn snapshot(&self) -> Vec<Assumption> {
        let mut assumptions: Vec<Assumption> = self
            .versions
            .read()
            .iter()
            .map(|(name, version)| Assumption {
                name: name.clone(),
                version: version.clone(),
            })
            .collect();
        assumptions.sort_by(|a, b| a.name.cmp(&b.name));
        assumptions
    }
}
