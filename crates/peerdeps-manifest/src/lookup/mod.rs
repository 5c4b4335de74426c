//! Manifest discovery: walking up to a package's own package.json and
//! resolving package names through node_modules directories.

use camino::{Utf8Path, Utf8PathBuf};
use peerdeps_core::utils::normalize_path;
use tracing::trace;

/// File name of a package manifest
pub const MANIFEST_FILE: &str = "package.json";

const NODE_MODULES: &str = "node_modules";

/// Maps directories and package names to manifest paths.
///
/// `None` means nothing could be found; lookups never fail otherwise.
pub trait ModuleResolver: Send + Sync {
    /// Nearest package.json at or above `dir`
    fn find_manifest(&self, dir: &Utf8Path) -> Option<Utf8PathBuf>;

    /// The package.json node would load for `name` when required from `base`
    fn resolve_manifest(&self, name: &str, base: &Utf8Path) -> Option<Utf8PathBuf>;
}

/// Node's lookup rules: every ancestor's `node_modules`, nearest first
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesResolver;

impl ModuleResolver for NodeModulesResolver {
    fn find_manifest(&self, dir: &Utf8Path) -> Option<Utf8PathBuf> {
        let start = absolutize(dir);
        let mut current = start.as_path();

        loop {
            let candidate = current.join(MANIFEST_FILE);
            if candidate.is_file() {
                trace!(%candidate, "found enclosing manifest");
                return Some(candidate);
            }

            // Move up one directory
            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    fn resolve_manifest(&self, name: &str, base: &Utf8Path) -> Option<Utf8PathBuf> {
        if !is_package_name(name) {
            return None;
        }

        let start = absolutize(base);
        for dir in start.ancestors() {
            // node_modules/node_modules is never searched
            if dir.file_name() == Some(NODE_MODULES) {
                continue;
            }

            let candidate = dir.join(NODE_MODULES).join(name).join(MANIFEST_FILE);
            if candidate.is_file() {
                trace!(name, %candidate, "resolved package");
                return Some(candidate);
            }
        }

        None
    }
}

/// `name` or `@scope/name`, nothing that could climb out of node_modules
fn is_package_name(name: &str) -> bool {
    let mut segments = name.split('/');
    let valid = |segment: &str| !segment.is_empty() && segment != "." && segment != "..";

    match (segments.next(), segments.next(), segments.next()) {
        (Some(scope), Some(package), None) => {
            scope.starts_with('@') && scope.len() > 1 && valid(package)
        },
        (Some(package), None, None) => !package.starts_with('@') && valid(package),
        _ => false,
    }
}

/// Anchor relative paths at the working directory so the walk can climb
/// past it
fn absolutize(path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }

    match std::env::current_dir().map(Utf8PathBuf::try_from) {
        Ok(Ok(cwd)) => normalize_path(&cwd.join(path)),
        _ => normalize_path(path),
    }
}
