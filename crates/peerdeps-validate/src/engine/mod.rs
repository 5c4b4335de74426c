//! The validation engine.
//!
//! `Validator` owns everything a validation touches besides the caller's
//! options: the manifest loader, the module resolver, the assumption table,
//! the default result store and the lookup memo. A call runs as follows:
//!
//! 1. pick the result store from `CacheMode`
//! 2. on a cache hit, replay the stored outcome through the failure handler
//! 3. otherwise find the enclosing manifest, reject dependency conflicts and
//!    check every peer dependency (assumptions first, then node_modules)
//! 4. store the outcome and hand a failure to the handler

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use peerdeps_core::error::{PeerError, PeerResult};
use peerdeps_core::types::{
    satisfies, Failure, IncompatibleRange, Manifest, MissingPeerDependency, ValidationResult,
};
use peerdeps_manifest::{JsonManifestLoader, ManifestLoader, ModuleResolver, NodeModulesResolver};
use tracing::{debug, trace};

use crate::assumptions::{Assumption, AssumptionRegistry};
use crate::cache::{cache_key, CacheMode, CacheView, Lookup, LookupMemo, MemoryStore, NullStore, ResultStore};
use crate::report::{dependency_conflict, summarize, FailureHandler, RaiseOnFailure};

/// Per-call options
#[derive(Default)]
pub struct ValidateOptions<'a> {
    cache: CacheMode<'a>,
    handler: Option<Box<dyn FailureHandler + 'a>>,
    resolve_from: Option<Utf8PathBuf>,
}

impl<'a> ValidateOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the result store (`true`, `false` or a caller store)
    pub fn cache(mut self, cache: impl Into<CacheMode<'a>>) -> Self {
        self.cache = cache.into();
        self
    }

    /// Receive failures instead of getting them back as errors
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Failure) -> PeerResult<()> + 'a,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Like `on_failure`, for handler types
    pub fn handler(mut self, handler: impl FailureHandler + 'a) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Resolve peer dependencies from `dir` instead of the root
    pub fn resolve_from(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.resolve_from = Some(dir.into());
        self
    }
}

impl fmt::Debug for ValidateOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("cache", &self.cache)
            .field("custom_handler", &self.handler.is_some())
            .field("resolve_from", &self.resolve_from)
            .finish()
    }
}

/// Peer dependency validator with its own assumptions and caches
pub struct Validator {
    loader: Box<dyn ManifestLoader>,
    resolver: Box<dyn ModuleResolver>,
    assumptions: AssumptionRegistry,
    results: MemoryStore,
    lookups: LookupMemo,
}

impl Validator {
    /// Validator reading package.json files and node_modules from disk
    pub fn new() -> Self {
        Self::with_parts(JsonManifestLoader, NodeModulesResolver)
    }

    /// Validator over a custom loader and resolver
    pub fn with_parts(
        loader: impl ManifestLoader + 'static,
        resolver: impl ModuleResolver + 'static,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            resolver: Box::new(resolver),
            assumptions: AssumptionRegistry::new(),
            results: MemoryStore::new(),
            lookups: LookupMemo::new(),
        }
    }

    /// Check the peer dependencies of the package enclosing `root`.
    ///
    /// Unmet peer dependencies go to the failure handler, which by default
    /// returns them as `PeerError::UnmetPeerDependencies`. A missing manifest
    /// and dependency conflicts are always returned as errors.
    pub fn validate(&self, root: impl AsRef<Utf8Path>, options: ValidateOptions<'_>) -> PeerResult<()> {
        let root = root.as_ref();
        let ValidateOptions {
            cache,
            handler,
            resolve_from,
        } = options;

        let handler: &dyn FailureHandler = match &handler {
            Some(handler) => handler.as_ref(),
            None => &RaiseOnFailure,
        };
        let store: &dyn ResultStore = match cache {
            CacheMode::Default => &self.results,
            CacheMode::Disabled => &NullStore,
            CacheMode::Custom(store) => store,
        };
        let memoize = matches!(cache, CacheMode::Default);

        let key = cache_key(root, resolve_from.as_deref());
        if store.has(&key) {
            match store.get(&key) {
                Some(ValidationResult::Satisfied) => {
                    debug!(%root, "cache hit: satisfied");
                    return Ok(());
                },
                Some(ValidationResult::Unmet(failure)) => {
                    debug!(%root, summary = %summarize(&failure), "cache hit: unmet");
                    return handler.handle(&failure);
                },
                None => {},
            }
        }

        debug!(%root, resolve_from = ?resolve_from, ?cache, "validating peer dependencies");
        let result = self.evaluate(root, resolve_from.as_deref(), memoize)?;
        store.set(&key, result.clone());

        match &result {
            ValidationResult::Satisfied => Ok(()),
            ValidationResult::Unmet(failure) => {
                debug!(%root, summary = %summarize(failure), "unmet peer dependencies");
                handler.handle(failure)
            },
        }
    }

    fn evaluate(
        &self,
        root: &Utf8Path,
        resolve_from: Option<&Utf8Path>,
        memoize: bool,
    ) -> PeerResult<ValidationResult> {
        let package_path = self
            .lookup(Lookup::Enclosing(root.to_path_buf()), memoize, || {
                self.resolver.find_manifest(root)
            })
            .ok_or_else(|| PeerError::ManifestNotFound {
                root: root.to_path_buf(),
            })?;
        let pkg = self.loader.load(&package_path)?;

        let conflicts = pkg.conflicting_peer_dependencies();
        if !conflicts.is_empty() {
            return Err(dependency_conflict(&pkg, &package_path, conflicts));
        }

        let base = resolve_from.unwrap_or(root);
        let mut missing = Vec::new();
        let mut incompatible = Vec::new();

        for (name, range) in &pkg.peer_dependencies {
            let version = match self.assumptions.get(name) {
                Some(version) => {
                    trace!(%name, %version, "using assumed version");
                    version
                },
                None => match self.resolve_version(&pkg, name, base, memoize)? {
                    Some(version) => version,
                    None => {
                        if pkg.is_optional_peer(name) {
                            trace!(%name, "optional peer dependency not installed");
                        } else {
                            missing.push(MissingPeerDependency {
                                name: name.clone(),
                                specified_peer_dependency_range: range.clone(),
                            });
                        }
                        continue;
                    },
                },
            };

            if satisfies(&version, range) {
                trace!(%name, %version, %range, "peer dependency satisfied");
            } else {
                incompatible.push(IncompatibleRange {
                    name: name.clone(),
                    specified_peer_dependency_range: range.clone(),
                    version,
                });
            }
        }

        Ok(ValidationResult::from_findings(pkg, package_path, missing, incompatible))
    }

    /// Installed version of peer dependency `name`, as seen from `base`
    fn resolve_version(
        &self,
        pkg: &Manifest,
        name: &str,
        base: &Utf8Path,
        memoize: bool,
    ) -> PeerResult<Option<String>> {
        let lookup = Lookup::Package {
            name: name.to_string(),
            base: base.to_path_buf(),
        };
        let Some(path) = self.lookup(lookup, memoize, || self.resolver.resolve_manifest(name, base)) else {
            trace!(package = %pkg.name, %name, %base, "peer dependency not found");
            return Ok(None);
        };

        Ok(Some(self.loader.load(&path)?.version))
    }

    fn lookup(
        &self,
        lookup: Lookup,
        memoize: bool,
        resolve: impl FnOnce() -> Option<Utf8PathBuf>,
    ) -> Option<Utf8PathBuf> {
        if memoize {
            self.lookups.get_or_resolve(lookup, resolve)
        } else {
            resolve()
        }
    }

    /// Treat `name` as installed at `version` from now on
    pub fn assume_provided(&self, name: impl Into<String>, version: impl Into<String>) -> PeerResult<()> {
        self.assume(Assumption::new(name, version)?)
    }

    pub fn assume(&self, assumption: Assumption) -> PeerResult<()> {
        debug!(%assumption, "assuming peer dependency is provided");
        self.assumptions.assume(assumption)
    }

    /// Clear the default result store and the lookup memo
    pub fn reset_cache(&self) {
        self.results.clear();
        self.lookups.clear();
    }

    pub fn reset_assumptions(&self) {
        self.assumptions.reset();
    }

    /// Read-only view of the default result store
    pub fn cache(&self) -> CacheView<'_> {
        CacheView::new(&self.results)
    }

    pub fn assumptions(&self) -> &AssumptionRegistry {
        &self.assumptions
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("assumptions", &self.assumptions)
            .field("results", &self.results)
            .field("lookups", &self.lookups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
