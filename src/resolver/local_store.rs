//! Resolver backed by the cache root itself
//!
//! Patterns are derived from the cache root on first use and re-derived only
//! when the root changes. Every public operation goes through
//! [`PatternProvider::patterns`], so call order never matters.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::cache::{
    CacheLayout, CacheMetadataOptions, DownloadReport, Lookup, RepositoryCache,
};
use crate::error::{CacheError, ResolverError};
use crate::module::{Artifact, DependencyDescriptor, ModuleId, ModuleRevisionId};
use crate::resolver::finder::{FoundRevision, RevisionFinder};
use crate::resolver::pattern_resolver::{PatternProvider, PatternResolver, PatternSet};
use crate::resolver::session::ResolutionSession;
use crate::resolver::traits::ModuleLocator;
use crate::resolver::types::{ModuleEntry, OrganisationEntry, ResolvedResource, RevisionEntry};
use crate::version::matcher::VersionMatcher;

pub const LOCAL_STORE_NAME: &str = "cache";

/// Where the local store currently lives
pub trait CacheRootSource: Send + Sync {
    fn cache_root(&self) -> PathBuf;
}

impl CacheRootSource for RepositoryCache {
    fn cache_root(&self) -> PathBuf {
        self.root().to_path_buf()
    }
}

impl CacheRootSource for PathBuf {
    fn cache_root(&self) -> PathBuf {
        self.clone()
    }
}

/// Patterns in effect and the source root they were configured against
#[derive(Debug, Clone)]
struct Configured {
    set: PatternSet,
    source_root: PathBuf,
}

/// Pattern provider configured from a cache root
///
/// An explicit [`ensure_configured`](Self::ensure_configured) root stays in
/// effect until the [`CacheRootSource`] reports a different root.
pub struct LocalStorePatterns {
    layout: CacheLayout,
    source: Arc<dyn CacheRootSource>,
    configured: Mutex<Option<Configured>>,
}

impl LocalStorePatterns {
    pub fn new(layout: CacheLayout, source: Arc<dyn CacheRootSource>) -> Self {
        Self {
            layout,
            source,
            configured: Mutex::new(None),
        }
    }

    fn configure(&self, root: Option<&Path>) -> Result<(bool, PatternSet), CacheError> {
        let source_root = self.source.cache_root();
        let mut configured = self.configured.lock().map_err(|_| CacheError::LockPoisoned)?;

        if let Some(current) = configured.as_ref() {
            let unchanged = match root {
                Some(root) => current.set.root == root,
                None => current.source_root == source_root,
            };
            if unchanged {
                return Ok((false, current.set.clone()));
            }
        }

        let root = root.unwrap_or(&source_root);
        let set = PatternSet::derive(root, &self.layout);
        debug!("Configured local store patterns for {}", root.display());
        *configured = Some(Configured {
            set: set.clone(),
            source_root,
        });
        Ok((true, set))
    }

    /// Derive patterns for `root` unless already configured for it
    ///
    /// Returns whether the patterns were (re-)derived.
    pub fn ensure_configured(&self, root: &Path) -> Result<bool, CacheError> {
        self.configure(Some(root)).map(|(derived, _)| derived)
    }

    pub fn configured_root(&self) -> Option<PathBuf> {
        self.configured
            .lock()
            .ok()
            .and_then(|c| c.as_ref().map(|current| current.set.root.clone()))
    }
}

impl PatternProvider for LocalStorePatterns {
    fn patterns(&self) -> Result<PatternSet, CacheError> {
        self.configure(None).map(|(_, set)| set)
    }
}

pub struct LocalStoreResolver {
    cache: Arc<RepositoryCache>,
    patterns: PatternResolver<LocalStorePatterns>,
    matcher: Arc<dyn VersionMatcher>,
}

impl LocalStoreResolver {
    pub fn new(cache: Arc<RepositoryCache>, matcher: Arc<dyn VersionMatcher>) -> Self {
        let source: Arc<dyn CacheRootSource> = cache.clone();
        Self::with_root_source(cache, source, matcher)
    }

    /// Local store whose patterns follow `source` rather than the cache root
    pub fn with_root_source(
        cache: Arc<RepositoryCache>,
        source: Arc<dyn CacheRootSource>,
        matcher: Arc<dyn VersionMatcher>,
    ) -> Self {
        let provider = LocalStorePatterns::new(cache.layout().clone(), source);
        Self {
            patterns: PatternResolver::new(LOCAL_STORE_NAME, provider, matcher.clone()),
            cache,
            matcher,
        }
    }

    pub fn cache(&self) -> &Arc<RepositoryCache> {
        &self.cache
    }

    pub fn ensure_configured(&self, root: &Path) -> Result<bool, CacheError> {
        self.patterns.provider().ensure_configured(root)
    }

    pub fn patterns(&self) -> Result<PatternSet, CacheError> {
        self.patterns.patterns()
    }

    pub fn exists(&self, artifact: &Artifact) -> Result<bool, ResolverError> {
        self.patterns.exists(artifact)
    }

    pub fn publish(&self, artifact: &Artifact, source: &Path, overwrite: bool) -> Result<PathBuf, ResolverError> {
        self.patterns.publish(artifact, source, overwrite)
    }

    pub fn list_organisations(&self) -> Result<Vec<OrganisationEntry>, ResolverError> {
        self.patterns.list_organisations()
    }

    pub fn list_modules(&self, organisation: &str) -> Result<Vec<ModuleEntry>, ResolverError> {
        self.patterns.list_modules(organisation)
    }

    pub fn list_revisions(&self, module: &ModuleId) -> Result<Vec<RevisionEntry>, ResolverError> {
        self.patterns.list_revisions(module)
    }

    /// The cache as seen from the configured root
    fn store(&self) -> Result<Arc<RepositoryCache>, CacheError> {
        let root = self.patterns.patterns()?.root;
        if root == self.cache.root() {
            Ok(self.cache.clone())
        } else {
            Ok(Arc::new(self.cache.rooted_at(root)))
        }
    }

    /// Cached revision for `dd`, searching the store itself for dynamic requests
    pub fn get_dependency(
        &self,
        dd: &DependencyDescriptor,
        options: &CacheMetadataOptions,
        session: &ResolutionSession,
    ) -> Result<Option<FoundRevision>, ResolverError> {
        let store = self.store()?;
        RevisionFinder::new(&store, self.matcher.as_ref(), Some(self as &dyn ModuleLocator))
            .find_in_cache(dd, options, session)
    }

    /// Report which artifacts are already present; nothing is transferred
    pub fn download(&self, artifacts: &[Artifact]) -> Result<DownloadReport, CacheError> {
        Ok(self.store()?.reconcile_artifacts(artifacts))
    }
}

impl ModuleLocator for LocalStoreResolver {
    fn name(&self) -> String {
        self.patterns.resolver_name().to_string()
    }

    fn locate(&self, dd: &DependencyDescriptor) -> Result<Option<ResolvedResource>, ResolverError> {
        let constraint = dd.revision_id().revision.clone();
        let options = CacheMetadataOptions::new().with_check_ttl(false);
        let store = self.store()?;
        self.patterns.select(dd, &|id: &ModuleRevisionId| {
            Ok(match store.lookup_module(id, &options)? {
                Lookup::Fresh(resolved) | Lookup::Stale(resolved) => {
                    self.matcher.accept_descriptor(&constraint, resolved.descriptor())
                }
                // Accepted so the lookup reports the missing descriptor
                Lookup::Absent => true,
            })
        })
    }
}
