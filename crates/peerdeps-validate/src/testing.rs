//! On-disk package fixtures for tests

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use peerdeps_core::types::Manifest;
use tempfile::TempDir;

/// A package directory with installed dependencies under its node_modules
pub(crate) struct Project {
    _temp_dir: TempDir,
    pub base_dir: Utf8PathBuf,
    pub pkg: Manifest,
    installed: Vec<(String, String)>,
    removed: Vec<String>,
}

impl Project {
    /// Nothing touches the disk until `write`
    pub fn new(name: &str) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let base_dir = Utf8PathBuf::from_path_buf(temp_dir.path().join(name)).unwrap();

        Self {
            _temp_dir: temp_dir,
            base_dir,
            pkg: Manifest::new(name, "0.0.0"),
            installed: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn add_peer_dependency(&mut self, name: &str, range: &str) {
        self.pkg.peer_dependencies.insert(name.to_string(), range.to_string());
    }

    pub fn add_dependency(&mut self, name: &str, version: &str) {
        self.pkg.dependencies.insert(name.to_string(), version.to_string());
        self.install(name, version);
    }

    pub fn add_dev_dependency(&mut self, name: &str, version: &str) {
        self.pkg.dev_dependencies.insert(name.to_string(), version.to_string());
        self.install(name, version);
    }

    pub fn remove_dev_dependency(&mut self, name: &str) {
        self.pkg.dev_dependencies.shift_remove(name);
        self.installed.retain(|(installed, _)| installed != name);
        self.removed.push(name.to_string());
    }

    fn install(&mut self, name: &str, version: &str) {
        self.installed.retain(|(installed, _)| installed != name);
        self.installed.push((name.to_string(), version.to_string()));
    }

    /// Path of the package's own manifest
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.base_dir.join("package.json")
    }

    pub fn write(&self) {
        fs::create_dir_all(&self.base_dir).unwrap();
        fs::write(self.manifest_path(), serde_json::to_string_pretty(&self.pkg).unwrap()).unwrap();

        let node_modules = self.base_dir.join("node_modules");
        for name in &self.removed {
            let dir = node_modules.join(name);
            if dir.exists() {
                fs::remove_dir_all(dir).unwrap();
            }
        }

        for (name, version) in &self.installed {
            write_package(&node_modules.join(name), name, version);
        }
    }
}

fn write_package(dir: &Utf8Path, name: &str, version: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(&Manifest::new(name, version)).unwrap(),
    )
    .unwrap();
}
