use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::atomic::KeyLocks;
use crate::cache::descriptor_store::DescriptorStore;
use crate::cache::freshness::{Clock, FreshnessPolicy, SystemClock};
use crate::cache::layout::CacheLayout;
use crate::cache::mapping_store::{MappingStore, ResolvedMapping};
use crate::cache::options::CacheMetadataOptions;
use crate::cache::origin_store::OriginStore;
use crate::cache::reconcile::{self, DownloadReport};
use crate::config::CacheConfig;
use crate::error::{CacheError, ResolverError};
use crate::module::{
    Artifact, ArtifactOrigin, DependencyDescriptor, ModuleRevisionId, ResolvedModuleRevision,
};
use crate::resolver::finder::{FoundRevision, RevisionFinder};
use crate::resolver::session::ResolutionSession;
use crate::resolver::traits::ModuleLocator;
use crate::version::matcher::VersionMatcher;

/// Result of looking up a concrete revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Fresh(ResolvedModuleRevision),
    /// Stored but older than its TTL
    Stale(ResolvedModuleRevision),
    Absent,
}

/// Durable cache shared by every resolution run on one root
pub struct RepositoryCache {
    root: PathBuf,
    layout: CacheLayout,
    descriptors: DescriptorStore,
    mappings: MappingStore,
    origins: OriginStore,
    freshness: FreshnessPolicy,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyLocks>,
}

impl std::fmt::Debug for RepositoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryCache")
            .field("root", &self.root)
            .field("layout", &self.layout)
            .field("freshness", &self.freshness)
            .finish_non_exhaustive()
    }
}

impl RepositoryCache {
    pub fn new(root: impl Into<PathBuf>, layout: CacheLayout, freshness: FreshnessPolicy) -> Self {
        let root = root.into();
        info!("Using cache root {}", root.display());
        Self::build(root, layout, freshness, Arc::new(SystemClock), Arc::new(KeyLocks::new()))
    }

    fn build(
        root: PathBuf,
        layout: CacheLayout,
        freshness: FreshnessPolicy,
        clock: Arc<dyn Clock>,
        locks: Arc<KeyLocks>,
    ) -> Self {
        Self {
            descriptors: DescriptorStore::new(root.clone(), layout.clone(), locks.clone()),
            mappings: MappingStore::new(root.clone(), layout.clone(), locks.clone()),
            origins: OriginStore::new(root.clone(), layout.clone(), locks.clone()),
            root,
            layout,
            freshness,
            clock,
            locks,
        }
    }

    /// The same cache settings, clock and write locks over another root
    pub fn rooted_at(&self, root: impl Into<PathBuf>) -> Self {
        Self::build(
            root.into(),
            self.layout.clone(),
            self.freshness.clone(),
            self.clock.clone(),
            self.locks.clone(),
        )
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.root.clone(), config.to_layout(), config.to_freshness_policy())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Stored record for a concrete revision, classified by freshness
    pub fn lookup_module(
        &self,
        id: &ModuleRevisionId,
        options: &CacheMetadataOptions,
    ) -> Result<Lookup, CacheError> {
        let Some(resolved) = self.descriptors.load(id, options.validate())? else {
            debug!("No cached descriptor for {}", id);
            return Ok(Lookup::Absent);
        };

        let fresh = self.freshness.is_fresh(
            &id.module_id,
            resolved.resolved_at(),
            self.now(),
            options.effective_check_ttl(),
        );
        if fresh {
            Ok(Lookup::Fresh(resolved))
        } else {
            debug!("Cached descriptor for {} is stale", id);
            Ok(Lookup::Stale(resolved))
        }
    }

    /// Trusted record for a concrete revision; missing or stale is `None`
    pub fn find_module_in_cache(
        &self,
        id: &ModuleRevisionId,
        options: &CacheMetadataOptions,
    ) -> Result<Option<ResolvedModuleRevision>, CacheError> {
        match self.lookup_module(id, options)? {
            Lookup::Fresh(resolved) => Ok(Some(resolved)),
            Lookup::Stale(_) | Lookup::Absent => Ok(None),
        }
    }

    /// Revision a resolver previously mapped `requested` to, if still trusted
    pub fn find_resolved_revision(
        &self,
        requested: &ModuleRevisionId,
        resolver: &str,
        options: &CacheMetadataOptions,
    ) -> Result<Option<ModuleRevisionId>, CacheError> {
        let Some(mapping) = self.mappings.load(requested, resolver)? else {
            return Ok(None);
        };
        let fresh = self.freshness.is_fresh(
            &requested.module_id,
            mapping.saved_at,
            self.now(),
            options.effective_check_ttl(),
        );
        if !fresh {
            debug!("Mapping for {} by {} is stale", requested, resolver);
            return Ok(None);
        }
        Ok(Some(mapping.resolved_id()))
    }

    /// Resolution lookup against this cache
    ///
    /// `catalog` is consulted for dynamic requests that no mapping answers.
    pub fn find_in_cache(
        &self,
        dd: &DependencyDescriptor,
        options: &CacheMetadataOptions,
        matcher: &dyn VersionMatcher,
        catalog: Option<&dyn ModuleLocator>,
        session: &ResolutionSession,
    ) -> Result<Option<FoundRevision>, ResolverError> {
        RevisionFinder::new(self, matcher, catalog).find_in_cache(dd, options, session)
    }

    pub fn save_resolved(&self, resolved: &ResolvedModuleRevision) -> Result<PathBuf, CacheError> {
        self.descriptors.save(resolved)
    }

    pub fn save_resolved_mapping(
        &self,
        requested: &ModuleRevisionId,
        resolver: &str,
        revision: &str,
    ) -> Result<(), CacheError> {
        self.mappings.save(&ResolvedMapping {
            requested: requested.clone(),
            resolver: resolver.to_string(),
            revision: revision.to_string(),
            saved_at: self.now(),
        })
    }

    pub fn save_origin(&self, artifact: &Artifact, origin: &ArtifactOrigin) -> Result<(), CacheError> {
        self.origins.put(artifact, origin)
    }

    pub fn get_origin(&self, artifact: &Artifact) -> Result<ArtifactOrigin, CacheError> {
        self.origins.get(artifact)
    }

    pub fn reconcile_artifacts(&self, artifacts: &[Artifact]) -> DownloadReport {
        reconcile::reconcile(&self.layout, &self.root, artifacts)
    }

    pub fn artifact_path(&self, artifact: &Artifact) -> Result<PathBuf, CacheError> {
        self.layout.artifact_path(&self.root, artifact)
    }

    pub fn descriptor_path(&self, id: &ModuleRevisionId) -> Result<PathBuf, CacheError> {
        self.descriptors.path(id)
    }

    /// Delete a stored descriptor; eviction policy is up to the caller
    pub fn remove_descriptor(&self, id: &ModuleRevisionId) -> Result<bool, CacheError> {
        self.descriptors.remove(id)
    }
}
