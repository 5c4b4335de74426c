//! Validation engine tests: on-disk projects first, then synthetic
//! manifests behind a fixture loader and resolver

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::testing::Project;

fn unmet_message(validator: &Validator, project: &Project) -> String {
    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap_err()
        .to_string()
}

#[test]
fn test_missing_peer_dependency() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.write();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* foo: `> 1`; it was not installed"
    );
}

#[test]
fn test_dependency_conflict() {
    let validator = Validator::new();
    let store: RefCell<HashMap<String, ValidationResult>> = RefCell::new(HashMap::new());
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_dependency("foo", "1.0.0");
    project.write();

    let err = validator
        .validate(&project.base_dir, ValidateOptions::new().cache(&store))
        .unwrap_err();

    assert!(matches!(err, PeerError::DependencyConflict { ref names, .. } if names == &["foo"]));
    let message = err.to_string();
    assert!(message.starts_with("test-app (at `"));
    assert!(message.ends_with(
        "test-app`) is improperly configured:\n\n\t* foo: included both as dependency and as a peer dependency"
    ));
    assert!(store.borrow().is_empty());
}

#[test]
fn test_dependency_conflict_is_rechecked() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_dependency("foo", "2.0.0");
    project.write();

    for _ in 0..2 {
        let err = validator
            .validate(&project.base_dir, ValidateOptions::new())
            .unwrap_err();
        assert!(matches!(err, PeerError::DependencyConflict { .. }));
    }
    assert!(validator.cache().is_empty());
}

#[test]
fn test_wrong_version() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* foo: `> 1`; it was resolved to `1.0.0`"
    );
}

#[test]
fn test_optional_peer_at_wrong_version_is_reported() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.pkg = project.pkg.clone().with_optional_peer("foo");
    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* foo: `> 1`; it was resolved to `1.0.0`"
    );
}

#[test]
fn test_optional_peer_not_installed_is_ignored() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.pkg = project.pkg.clone().with_optional_peer("foo");
    project.write();

    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();
}

#[test]
fn test_some_met_others_missing() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_peer_dependency("bar", ">= 2");
    project.add_dev_dependency("foo", "2.0.0");
    project.write();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* bar: `>= 2`; it was not installed"
    );
}

#[test]
fn test_some_met_others_unsupported() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_peer_dependency("bar", ">= 2");
    project.add_dev_dependency("foo", "2.0.0");
    project.add_dev_dependency("bar", "1.0.0");
    project.write();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* bar: `>= 2`; it was resolved to `1.0.0`"
    );
}

#[test]
fn test_missing_and_outdated() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_peer_dependency("bar", ">= 2");
    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* bar: `>= 2`; it was not installed\n\t* foo: `> 1`; it was resolved to `1.0.0`"
    );
}

#[test]
fn test_satisfied() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", ">= 1");
    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();
    assert_eq!(
        validator.cache().get(project.base_dir.as_str()),
        Some(ValidationResult::Satisfied)
    );
}

#[test]
fn test_no_peer_dependencies() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();
}

#[test]
fn test_prerelease_versions_satisfy() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", ">= 1");
    project.add_peer_dependency("bar", "^2.0.0");
    project.add_dev_dependency("foo", "1.1.0-beta.1");
    project.add_dev_dependency("bar", "2.1.0-alpha.1");
    project.write();

    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();
}

#[test]
fn test_validate_from_nested_directory() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "^1.0.0");
    project.add_dev_dependency("foo", "1.2.0");
    project.write();

    let nested = project.base_dir.join("lib").join("deep");
    std::fs::create_dir_all(&nested).unwrap();

    validator.validate(&nested, ValidateOptions::new()).unwrap();
}

#[test]
fn test_resolve_from_results_are_cached_separately() {
    let validator = Validator::new();
    let mut linked = Project::new("foo");
    linked.add_peer_dependency("bar", "^1.0.0");
    linked.write();

    let mut project = Project::new("test-app");
    project.add_dev_dependency("bar", "1.0.0");
    project.write();

    validator
        .validate(
            &linked.base_dir,
            ValidateOptions::new().resolve_from(&project.base_dir),
        )
        .unwrap();

    assert_eq!(
        unmet_message(&validator, &linked),
        "foo has the following unmet peerDependencies:\n\n\t* bar: `^1.0.0`; it was not installed"
    );
    assert_eq!(validator.cache().len(), 2);
}

#[test]
fn test_resolve_from_records_one_entry_in_caller_store() {
    let validator = Validator::new();
    let store: RefCell<HashMap<String, ValidationResult>> = RefCell::new(HashMap::new());
    let mut linked = Project::new("foo");
    linked.add_peer_dependency("bar", "^1.0.0");
    linked.write();

    let mut project = Project::new("test-app");
    project.add_dev_dependency("bar", "1.0.0");
    project.write();

    validator
        .validate(
            &linked.base_dir,
            ValidateOptions::new()
                .cache(&store)
                .resolve_from(&project.base_dir),
        )
        .unwrap();

    assert_eq!(store.borrow().len(), 1);
    assert!(validator.cache().is_empty());
}

#[test]
fn test_manifest_not_found_is_cached_by_default() {
    let validator = Validator::new();
    let project = Project::new("test-app");

    let err = validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "could not find a package.json when resolving upwards from:\n\t{}",
            project.base_dir
        )
    );

    project.write();
    let err = validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap_err();
    assert!(matches!(err, PeerError::ManifestNotFound { .. }));

    validator.reset_cache();
    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();
}

#[test]
fn test_manifest_not_found_without_cache() {
    let validator = Validator::new();
    let project = Project::new("test-app");

    let err = validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap_err();
    assert!(matches!(err, PeerError::ManifestNotFound { ref root } if root == &project.base_dir));

    project.write();
    validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap();
}

#[test]
fn test_caches_success_by_default() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", ">= 1");
    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();

    project.remove_dev_dependency("foo");
    project.write();

    // still satisfied, the earlier outcome masks the change
    validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap();

    validator.reset_cache();
    assert!(validator
        .validate(&project.base_dir, ValidateOptions::new())
        .is_err());
}

#[test]
fn test_caches_failures_by_default() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", ">= 1");
    project.write();

    let first = unmet_message(&validator, &project);

    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    assert_eq!(unmet_message(&validator, &project), first);
    assert_eq!(
        first,
        "test-app has the following unmet peerDependencies:\n\n\t* foo: `>= 1`; it was not installed"
    );
}

#[test]
fn test_cache_disabled_re_resolves() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", ">= 1");
    project.write();

    let err = validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap_err();
    assert!(err.to_string().contains("foo: `>= 1`; it was not installed"));

    project.add_dev_dependency("foo", "1.0.0");
    project.write();

    validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap();
    assert!(validator.cache().is_empty());
}

#[test]
fn test_caller_supplied_store() {
    let validator = Validator::new();
    let store: RefCell<HashMap<String, ValidationResult>> = RefCell::new(HashMap::new());
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", ">= 1");
    project.write();

    let err = validator
        .validate(&project.base_dir, ValidateOptions::new().cache(&store))
        .unwrap_err();
    assert!(err.to_string().contains("foo: `>= 1`; it was not installed"));

    assert_eq!(store.borrow().len(), 1);
    assert!(store.borrow().contains_key(project.base_dir.as_str()));
    assert!(validator.cache().is_empty());
}

#[test]
fn test_caller_store_gets_one_entry_per_root() {
    let validator = Validator::new();
    let store = MemoryStore::new();
    let projects: Vec<Project> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let project = Project::new(name);
            project.write();
            project
        })
        .collect();

    for project in projects.iter().chain(projects.iter()) {
        validator
            .validate(&project.base_dir, ValidateOptions::new().cache(&store))
            .unwrap();
    }

    assert_eq!(store.len(), 3);
}

#[test]
fn test_custom_handler_receives_failure() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.add_peer_dependency("bar", ">= 2");
    project.add_dev_dependency("bar", "1.0.0");
    project.write();

    let seen = RefCell::new(Vec::new());
    validator
        .validate(
            &project.base_dir,
            ValidateOptions::new().on_failure(|failure| {
                seen.borrow_mut().push(failure.clone());
                Ok(())
            }),
        )
        .unwrap();

    let seen = seen.into_inner();
    assert_eq!(seen.len(), 1);
    let failure = &seen[0];
    assert_eq!(failure.pkg.name, "test-app");
    assert!(failure.package_path.ends_with("test-app/package.json"));
    assert_eq!(
        failure.missing(),
        &[MissingPeerDependency {
            name: "foo".to_string(),
            specified_peer_dependency_range: "> 1".to_string(),
        }]
    );
    assert_eq!(
        failure.incompatible(),
        &[IncompatibleRange {
            name: "bar".to_string(),
            specified_peer_dependency_range: ">= 2".to_string(),
            version: "1.0.0".to_string(),
        }]
    );
}

#[test]
fn test_cached_failure_is_replayed_to_handler() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "> 1");
    project.write();

    let calls = AtomicUsize::new(0);
    for _ in 0..3 {
        validator
            .validate(
                &project.base_dir,
                ValidateOptions::new().on_failure(|_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(validator.cache().len(), 1);
}

#[test]
fn test_assumption_satisfies_missing_peer() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "^2.0.0");
    project.write();

    validator.assume_provided("foo", "2.1.0").unwrap();
    validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap();

    validator.assume_provided("foo", "3.0.0").unwrap();
    let err = validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap_err();
    assert!(err.to_string().contains("foo: `^2.0.0`; it was resolved to `3.0.0`"));

    validator.reset_assumptions();
    let err = validator
        .validate(&project.base_dir, ValidateOptions::new().cache(false))
        .unwrap_err();
    assert!(err.to_string().contains("foo: `^2.0.0`; it was not installed"));
}

#[test]
fn test_assumption_overrides_installed_package() {
    let validator = Validator::new();
    let mut project = Project::new("test-app");
    project.add_peer_dependency("foo", "^2.0.0");
    project.add_dev_dependency("foo", "2.0.0");
    project.write();

    validator.assume_provided("foo", "1.0.0").unwrap();

    assert_eq!(
        unmet_message(&validator, &project),
        "test-app has the following unmet peerDependencies:\n\n\t* foo: `^2.0.0`; it was resolved to `1.0.0`"
    );
}

#[test]
fn test_invalid_assumption_is_rejected() {
    let validator = Validator::new();
    let err = validator.assume_provided("foo", "").unwrap_err();

    assert!(matches!(err, PeerError::InvalidAssumption { .. }));
    assert!(validator.assumptions().is_empty());
}

#[test]
fn test_malformed_manifest_is_not_cached() {
    let validator = Validator::new();
    let project = Project::new("test-app");
    std::fs::create_dir_all(&project.base_dir).unwrap();
    std::fs::write(project.manifest_path(), "{ not json").unwrap();

    let err = validator
        .validate(&project.base_dir, ValidateOptions::new())
        .unwrap_err();
    assert!(matches!(err, PeerError::JsonParse { .. }));
    assert!(validator.cache().is_empty());
}

/// Manifests keyed by path, counting loads
#[derive(Default)]
struct FixtureLoader {
    manifests: HashMap<Utf8PathBuf, Manifest>,
    loads: Arc<AtomicUsize>,
}

impl ManifestLoader for FixtureLoader {
    fn load(&self, path: &Utf8Path) -> PeerResult<Manifest> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.manifests
            .get(path)
            .cloned()
            .ok_or_else(|| PeerError::io(format!("Failed to read {}", path), std::io::ErrorKind::NotFound.into()))
    }
}

/// Fixed lookup answers, counting lookups
#[derive(Default)]
struct FixtureResolver {
    enclosing: HashMap<Utf8PathBuf, Utf8PathBuf>,
    packages: HashMap<(String, Utf8PathBuf), Utf8PathBuf>,
    lookups: Arc<AtomicUsize>,
}

impl ModuleResolver for FixtureResolver {
    fn find_manifest(&self, dir: &Utf8Path) -> Option<Utf8PathBuf> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.enclosing.get(dir).cloned()
    }

    fn resolve_manifest(&self, name: &str, base: &Utf8Path) -> Option<Utf8PathBuf> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.packages
            .get(&(name.to_string(), base.to_path_buf()))
            .cloned()
    }
}

struct Fixture {
    validator: Validator,
    loads: Arc<AtomicUsize>,
    lookups: Arc<AtomicUsize>,
}

/// `/app` declares peers `foo` (installed 1.5.0) and `bar` (not installed)
fn fixture() -> Fixture {
    let mut loader = FixtureLoader::default();
    let mut resolver = FixtureResolver::default();

    let app = Manifest::new("app", "1.0.0")
        .with_peer_dependency("foo", "^1.0.0")
        .with_peer_dependency("bar", "^2.0.0");
    loader.manifests.insert("/app/package.json".into(), app);
    loader.manifests.insert(
        "/app/node_modules/foo/package.json".into(),
        Manifest::new("foo", "1.5.0"),
    );
    resolver
        .enclosing
        .insert("/app".into(), "/app/package.json".into());
    resolver.packages.insert(
        ("foo".to_string(), "/app".into()),
        "/app/node_modules/foo/package.json".into(),
    );

    let loads = loader.loads.clone();
    let lookups = resolver.lookups.clone();
    Fixture {
        validator: Validator::with_parts(loader, resolver),
        loads,
        lookups,
    }
}

#[test]
fn test_synthetic_manifests() {
    let Fixture { validator, loads, .. } = fixture();

    let err = validator.validate("/app", ValidateOptions::new()).unwrap_err();
    let failure = err.failure().unwrap();

    assert_eq!(failure.package_path, Utf8PathBuf::from("/app/package.json"));
    assert_eq!(failure.missing().len(), 1);
    assert_eq!(failure.missing()[0].name, "bar");
    assert!(failure.incompatible_ranges.is_none());
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_cache_hit_skips_all_lookups() {
    let Fixture { validator, loads, lookups } = fixture();

    let _ = validator.validate("/app", ValidateOptions::new());
    let _ = validator.validate("/app", ValidateOptions::new());

    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(lookups.load(Ordering::SeqCst), 3);
}

#[test]
fn test_lookup_memo_only_under_default_cache() {
    let Fixture { validator, lookups, .. } = fixture();

    let _ = validator.validate("/nowhere", ValidateOptions::new());
    let _ = validator.validate("/nowhere/", ValidateOptions::new());
    let _ = validator.validate("/nowhere", ValidateOptions::new());
    // the trailing slash is a different root but the same directory
    assert_eq!(lookups.load(Ordering::SeqCst), 1);

    let _ = validator.validate("/nowhere", ValidateOptions::new().cache(false));
    let _ = validator.validate("/nowhere", ValidateOptions::new().cache(false));
    assert_eq!(lookups.load(Ordering::SeqCst), 3);

    validator.reset_cache();
    let _ = validator.validate("/nowhere", ValidateOptions::new());
    assert_eq!(lookups.load(Ordering::SeqCst), 4);
}

#[test]
fn test_assumptions_skip_resolution() {
    let Fixture { validator, lookups, loads } = fixture();
    validator.assume_provided("foo", "1.9.9").unwrap();
    validator.assume_provided("bar", "2.0.0").unwrap();

    validator
        .validate("/app", ValidateOptions::new().cache(false))
        .unwrap();

    // only the root's own manifest was looked up and read
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handler_error_is_returned() {
    let Fixture { validator, .. } = fixture();

    let err = validator
        .validate(
            "/app",
            ValidateOptions::new().on_failure(|failure| {
                Err(PeerError::unmet(failure.clone()))
            }),
        )
        .unwrap_err();
    assert!(err.is_validation_failure());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    /// Each peer is `(installed major, declared major)`; `None` when absent
    fn validator_for(peers: &[(Option<u64>, u64)]) -> Validator {
        let mut loader = FixtureLoader::default();
        let mut resolver = FixtureResolver::default();
        let mut app = Manifest::new("app", "1.0.0");

        for (index, (installed, declared)) in peers.iter().enumerate() {
            let name = format!("peer-{index}");
            app = app.with_peer_dependency(&name, format!("{declared}.x"));

            if let Some(major) = installed {
                let path = Utf8PathBuf::from(format!("/app/node_modules/{name}/package.json"));
                loader
                    .manifests
                    .insert(path.clone(), Manifest::new(&name, format!("{major}.2.3")));
                resolver.packages.insert((name, "/app".into()), path);
            }
        }

        loader.manifests.insert("/app/package.json".into(), app);
        resolver
            .enclosing
            .insert("/app".into(), "/app/package.json".into());

        Validator::with_parts(loader, resolver)
    }

    proptest! {
        #[test]
        fn findings_match_installed_state(
            peers in prop::collection::vec((prop::option::of(0u64..4), 0u64..4), 0..8)
        ) {
            let validator = validator_for(&peers);
            let result = validator.validate("/app", ValidateOptions::new().cache(false));

            let expected_missing: Vec<String> = peers
                .iter()
                .enumerate()
                .filter(|(_, (installed, _))| installed.is_none())
                .map(|(index, _)| format!("peer-{index}"))
                .collect();
            let expected_incompatible: Vec<String> = peers
                .iter()
                .enumerate()
                .filter(|(_, (installed, declared))| matches!(installed, Some(major) if major != declared))
                .map(|(index, _)| format!("peer-{index}"))
                .collect();

            match result {
                Ok(()) => {
                    prop_assert!(expected_missing.is_empty());
                    prop_assert!(expected_incompatible.is_empty());
                },
                Err(err) => {
                    let failure = err.failure().cloned().unwrap();
                    let missing: Vec<String> = failure.missing().iter().map(|m| m.name.clone()).collect();
                    let incompatible: Vec<String> =
                        failure.incompatible().iter().map(|i| i.name.clone()).collect();
                    prop_assert_eq!(missing, expected_missing);
                    prop_assert_eq!(incompatible, expected_incompatible);
                },
            }
        }
    }
}
