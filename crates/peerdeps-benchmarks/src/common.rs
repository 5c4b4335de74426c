//! Common utilities for benchmarks

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use criterion::Criterion;
use peerdeps_core::types::Manifest;
use pprof::criterion::{Output, PProfProfiler};
use tempfile::TempDir;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// A package with `peer_count` peer dependencies, every other one installed
pub struct BenchProject {
    _temp_dir: TempDir,
    pub root: Utf8PathBuf,
}

impl BenchProject {
    pub fn new(peer_count: usize) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp_dir.path().join("app")).unwrap();

        let mut manifest = Manifest::new("app", "1.0.0");
        for index in 0..peer_count {
            let name = format!("peer-{index}");
            manifest = manifest.with_peer_dependency(&name, "^1.0.0");
            if index % 2 == 0 {
                write_manifest(
                    &root.join("node_modules").join(&name),
                    &Manifest::new(&name, format!("1.{index}.0")),
                );
            }
        }
        write_manifest(&root, &manifest);

        Self {
            _temp_dir: temp_dir,
            root,
        }
    }
}

/// package.json content with `count` peer dependencies
pub fn create_manifest_content(count: usize) -> String {
    let mut manifest = Manifest::new("bench-package", "1.0.0");
    for index in 0..count {
        manifest = manifest
            .with_peer_dependency(format!("peer-{index}"), format!(">= {index}.0.0 < {}.0.0", index + 1))
            .with_dev_dependency(format!("peer-{index}"), format!("{index}.1.0"));
    }
    serde_json::to_string_pretty(&manifest).unwrap()
}

fn write_manifest(dir: &Utf8Path, manifest: &Manifest) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(manifest).unwrap(),
    )
    .unwrap();
}
