//! Cache test utilities

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use tempfile::TempDir;

use modcache::cache::{CacheLayout, Clock, FreshnessPolicy, RepositoryCache};
use modcache::module::{Artifact, ModuleDescriptor, ModuleId, ModuleRevisionId, ResolvedModuleRevision};
use modcache::resolver::CacheRootSource;

pub fn mrid(organisation: &str, module: &str, revision: &str) -> ModuleRevisionId {
    ModuleRevisionId::new(ModuleId::new(organisation, module), revision)
}

pub fn artifact(id: &ModuleRevisionId, name: &str, artifact_type: &str, ext: &str) -> Artifact {
    Artifact::new(id.clone(), name, artifact_type, ext, epoch())
}

pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Cache under a fresh temp dir with the default layout and a manual clock
pub fn create_test_cache(ttl: TimeDelta) -> (TempDir, Arc<ManualClock>, Arc<RepositoryCache>) {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(epoch()));
    let cache = RepositoryCache::new(temp_dir.path(), CacheLayout::default(), FreshnessPolicy::new(ttl))
        .with_clock(clock.clone());
    (temp_dir, clock, Arc::new(cache))
}

/// Store a descriptor for `id` resolved by `resolver` at the cache's current time
pub fn save_descriptor(
    cache: &RepositoryCache,
    id: &ModuleRevisionId,
    status: &str,
    resolver: &str,
) -> ResolvedModuleRevision {
    let mut descriptor = ModuleDescriptor::new(id.clone(), epoch());
    descriptor.status = status.to_string();
    let resolved = ResolvedModuleRevision::new(descriptor, resolver, cache.now());
    cache.save_resolved(&resolved).unwrap();
    resolved
}

pub fn write_file(path: &Path, content: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Root source that can be pointed elsewhere mid-test
pub struct SwitchableRoot {
    root: Mutex<PathBuf>,
}

impl SwitchableRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Mutex::new(root.into()),
        }
    }

    pub fn switch_to(&self, root: impl Into<PathBuf>) {
        *self.root.lock().unwrap() = root.into();
    }
}

impl CacheRootSource for SwitchableRoot {
    fn cache_root(&self) -> PathBuf {
        self.root.lock().unwrap().clone()
    }
}
