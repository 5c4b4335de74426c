//! package.json parsing and loading

use camino::Utf8Path;
use peerdeps_core::error::PeerError;
use peerdeps_core::types::Manifest;
use tracing::trace;

use crate::ManifestResult;

/// Loads a manifest from a path.
///
/// The engine only ever goes through this trait, so tests can hand it
/// synthetic manifests without writing files.
pub trait ManifestLoader: Send + Sync {
    fn load(&self, path: &Utf8Path) -> ManifestResult<Manifest>;
}

/// Reads package.json files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestLoader;

impl ManifestLoader for JsonManifestLoader {
    fn load(&self, path: &Utf8Path) -> ManifestResult<Manifest> {
        load_manifest(path)
    }
}

/// Parse a package.json document
pub fn parse_manifest(path: &Utf8Path, content: &str) -> ManifestResult<Manifest> {
    serde_json::from_str(content).map_err(|e| PeerError::JsonParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and parse package.json from file path
pub fn load_manifest(path: &Utf8Path) -> ManifestResult<Manifest> {
    trace!(%path, "reading manifest");
    let content = std::fs::read_to_string(path)
        .map_err(|e| PeerError::io(format!("Failed to read {}", path), e))?;

    parse_manifest(path, &content)
}
