mod helper;

use std::sync::Arc;

use chrono::TimeDelta;
use tempfile::TempDir;

use helper::{SwitchableRoot, artifact, create_test_cache, mrid, save_descriptor, write_file};
use modcache::cache::{ArtifactOutcome, CacheMetadataOptions, FailureReason};
use modcache::error::ResolverError;
use modcache::module::DependencyDescriptor;
use modcache::resolver::{CacheRootSource, LocalStoreResolver, ResolutionSession};
use modcache::version::matchers::ChainVersionMatcher;

#[test]
fn configuring_twice_with_the_same_root_keeps_the_patterns() {
    let (temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    let store = LocalStoreResolver::new(cache, Arc::new(ChainVersionMatcher::default()));

    assert!(store.ensure_configured(temp_dir.path()).unwrap());
    let first = store.patterns().unwrap();
    assert!(!store.ensure_configured(temp_dir.path()).unwrap());

    assert_eq!(store.patterns().unwrap(), first);
}

#[test]
fn switching_the_root_redirects_exists() {
    let (temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    let other = TempDir::new().unwrap();
    let root = Arc::new(SwitchableRoot::new(temp_dir.path()));
    let store = LocalStoreResolver::with_root_source(
        cache.clone(),
        root.clone(),
        Arc::new(ChainVersionMatcher::default()),
    );
    let jar = artifact(&mrid("org", "module", "1.0"), "module", "jar", "jar");
    write_file(&cache.artifact_path(&jar).unwrap(), b"jar");
    assert!(store.exists(&jar).unwrap());

    root.switch_to(other.path());

    assert!(!store.exists(&jar).unwrap());
    assert_eq!(store.patterns().unwrap().root, root.cache_root());
    write_file(
        &other.path().join("org/module/1.0/jars/module.jar"),
        b"other jar",
    );
    assert!(store.exists(&jar).unwrap());
}

#[test]
fn configuring_a_new_root_redirects_exists() {
    let (temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    let other = TempDir::new().unwrap();
    let store = LocalStoreResolver::new(cache, Arc::new(ChainVersionMatcher::default()));
    let jar = artifact(&mrid("org", "module", "1.0"), "module", "jar", "jar");
    write_file(&other.path().join("org/module/1.0/jars/module.jar"), b"jar");

    assert!(store.ensure_configured(temp_dir.path()).unwrap());
    assert!(!store.exists(&jar).unwrap());
    assert!(store.ensure_configured(other.path()).unwrap());

    assert!(store.exists(&jar).unwrap());
    assert_eq!(store.patterns().unwrap().root, other.path());
    assert_eq!(store.download(std::slice::from_ref(&jar)).unwrap().failed().count(), 0);
}

#[test]
fn branch_only_revision_does_not_make_the_cache_inconsistent() {
    let (_temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    save_descriptor(&cache, &mrid("org", "module", "1.0"), "integration", "remote");
    save_descriptor(
        &cache,
        &mrid("org", "module", "2.0").with_branch("trunk"),
        "integration",
        "remote",
    );
    let store = LocalStoreResolver::new(cache, Arc::new(ChainVersionMatcher::default()));

    let found = store
        .get_dependency(
            &DependencyDescriptor::new(mrid("org", "module", "latest.integration")),
            &CacheMetadataOptions::new().with_check_ttl(false),
            &ResolutionSession::new(),
        )
        .unwrap()
        .unwrap();

    assert_eq!(found.id(), &mrid("org", "module", "1.0"));
}

#[test]
fn reconciliation_reports_artifacts_in_request_order() {
    let (_temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    let store = LocalStoreResolver::new(cache.clone(), Arc::new(ChainVersionMatcher::default()));
    let id = mrid("org", "module", "1.0");
    let x = artifact(&id, "x", "jar", "jar");
    let y = artifact(&id, "y", "jar", "jar");
    write_file(&cache.artifact_path(&x).unwrap(), b"0123456789");

    let report = store.download(&[x.clone(), y.clone()]).unwrap();
    let entries: Vec<_> = report.iter().collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].artifact, x);
    assert_eq!(
        entries[0].outcome,
        ArtifactOutcome::Satisfied {
            local_file: cache.artifact_path(&x).unwrap(),
            size: 10,
        }
    );
    assert_eq!(entries[1].artifact, y);
    assert_eq!(entries[1].outcome, ArtifactOutcome::Failed(FailureReason::NotFound));
}

#[test]
fn listing_skips_internal_record_directories() {
    let (_temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    let latest = mrid("org", "module", "latest.integration");
    save_descriptor(&cache, &mrid("org", "module", "1.0"), "release", "remote");
    save_descriptor(&cache, &mrid("org", "module", "1.10"), "release", "remote");
    save_descriptor(&cache, &mrid("org", "module", "1.2"), "release", "remote");
    cache.save_resolved_mapping(&latest, "remote", "1.10").unwrap();
    let store = LocalStoreResolver::new(cache, Arc::new(ChainVersionMatcher::default()));

    let organisations: Vec<String> = store
        .list_organisations()
        .unwrap()
        .into_iter()
        .map(|entry| entry.organisation)
        .collect();
    let revisions: Vec<String> = store
        .list_revisions(&mrid("org", "module", "1.0").module_id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.module_revision_id.revision)
        .collect();

    assert_eq!(organisations, vec!["org"]);
    assert_eq!(revisions, vec!["1.0", "1.2", "1.10"]);
}

#[test]
fn publish_refuses_to_overwrite_unless_asked() {
    let (temp_dir, _clock, cache) = create_test_cache(TimeDelta::seconds(10));
    let store = LocalStoreResolver::new(cache.clone(), Arc::new(ChainVersionMatcher::default()));
    let jar = artifact(&mrid("org", "module", "1.0"), "module", "jar", "jar");
    let source = temp_dir.path().join("build/module.jar");
    write_file(&source, b"v1");

    let target = store.publish(&jar, &source, false).unwrap();
    assert_eq!(target, cache.artifact_path(&jar).unwrap());
    assert!(matches!(
        store.publish(&jar, &source, false),
        Err(ResolverError::AlreadyExists(path)) if path == target
    ));

    write_file(&source, b"v2");
    store.publish(&jar, &source, true).unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"v2");
}
