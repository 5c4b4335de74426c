//! Result stores and the lookup memo.
//!
//! Validation results are memoized per cache key in a `ResultStore`. The
//! engine picks the store once per call from a `CacheMode`: the shared
//! default store, a store that never remembers anything, or one supplied by
//! the caller.

use std::cell::RefCell;
use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use dashmap::DashMap;
use peerdeps_core::types::ValidationResult;

/// Key → result memo
pub trait ResultStore {
    fn get(&self, key: &str) -> Option<ValidationResult>;
    fn set(&self, key: &str, value: ValidationResult);
    fn has(&self, key: &str) -> bool;
}

/// Which store a validation call reads and writes
#[derive(Clone, Copy, Default)]
pub enum CacheMode<'a> {
    /// The validator's shared store
    #[default]
    Default,
    /// Never hit, never store
    Disabled,
    /// A store owned by the caller
    Custom(&'a dyn ResultStore),
}

impl From<bool> for CacheMode<'_> {
    fn from(enabled: bool) -> Self {
        if enabled {
            CacheMode::Default
        } else {
            CacheMode::Disabled
        }
    }
}

impl<'a, S: ResultStore> From<&'a S> for CacheMode<'a> {
    fn from(store: &'a S) -> Self {
        CacheMode::Custom(store)
    }
}

impl std::fmt::Debug for CacheMode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheMode::Default => f.write_str("Default"),
            CacheMode::Disabled => f.write_str("Disabled"),
            CacheMode::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, ValidationResult>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl ResultStore for MemoryStore {
    fn get(&self, key: &str) -> Option<ValidationResult> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: ValidationResult) {
        self.entries.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// Single-threaded map, the simplest store to hand in and inspect afterwards
impl ResultStore for RefCell<HashMap<String, ValidationResult>> {
    fn get(&self, key: &str) -> Option<ValidationResult> {
        self.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: ValidationResult) {
        self.borrow_mut().insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.borrow().contains_key(key)
    }
}

/// Store behind `CacheMode::Disabled`
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl ResultStore for NullStore {
    fn get(&self, _key: &str) -> Option<ValidationResult> {
        None
    }

    fn set(&self, _key: &str, _value: ValidationResult) {}

    fn has(&self, _key: &str) -> bool {
        false
    }
}

/// Read-only view of a validator's default store
#[derive(Debug, Clone, Copy)]
pub struct CacheView<'a> {
    store: &'a MemoryStore,
}

impl<'a> CacheView<'a> {
    pub(crate) fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    pub fn get(&self, key: &str) -> Option<ValidationResult> {
        self.store.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.has(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }
}

/// Cache key for a root, scoped by the alternate resolution base if any
pub fn cache_key(root: &Utf8Path, resolve_from: Option<&Utf8Path>) -> String {
    match resolve_from {
        None => root.as_str().to_string(),
        Some(base) => format!("{}\0{}", root, base),
    }
}

/// A filesystem question the engine asks the module resolver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// Nearest manifest at or above a directory
    Enclosing(Utf8PathBuf),
    /// Manifest of a named package as seen from a base directory
    Package { name: String, base: Utf8PathBuf },
}

/// Memoized module resolver answers, including "not found"
#[derive(Debug, Default)]
pub struct LookupMemo {
    answers: DashMap<Lookup, Option<Utf8PathBuf>>,
}

impl LookupMemo {
    pub fn new() -> Self {
        Self {
            answers: DashMap::new(),
        }
    }

    /// Return the remembered answer or compute and remember it
    pub fn get_or_resolve(
        &self,
        lookup: Lookup,
        resolve: impl FnOnce() -> Option<Utf8PathBuf>,
    ) -> Option<Utf8PathBuf> {
        if let Some(answer) = self.answers.get(&lookup) {
            return answer.value().clone();
        }

        let answer = resolve();
        self.answers.insert(lookup, answer.clone());
        answer
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&self) {
        self.answers.clear();
    }
}
