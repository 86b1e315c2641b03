//! Revision lookup against the cache
//!
//! Exact requests are answered by the descriptor store alone. Dynamic requests
//! are first turned into a concrete revision, through a saved mapping or the
//! catalog, and that revision must then be cached: a catalog that names a
//! revision the store does not hold is an inconsistency, not a miss.

use std::sync::Arc;

use crate::cache::{CacheMetadataOptions, Lookup, RepositoryCache};
use crate::error::{CacheError, ResolverError};
use crate::module::{DependencyDescriptor, ModuleRevisionId, ResolvedModuleRevision};
use crate::resolver::observer::ResolutionEvent;
use crate::resolver::session::ResolutionSession;
use crate::resolver::traits::ModuleLocator;
use crate::version::matcher::VersionMatcher;

/// A cache hit, tagged with how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoundRevision {
    /// Exact request answered directly
    Direct(Arc<ResolvedModuleRevision>),
    /// Dynamic request answered through a concrete revision
    Searched {
        requested: ModuleRevisionId,
        revision: Arc<ResolvedModuleRevision>,
    },
}

impl FoundRevision {
    pub fn revision(&self) -> &Arc<ResolvedModuleRevision> {
        match self {
            FoundRevision::Direct(revision) | FoundRevision::Searched { revision, .. } => revision,
        }
    }

    pub fn id(&self) -> &ModuleRevisionId {
        self.revision().id()
    }

    /// The original request, for dynamic hits
    pub fn requested(&self) -> Option<&ModuleRevisionId> {
        match self {
            FoundRevision::Direct(_) => None,
            FoundRevision::Searched { requested, .. } => Some(requested),
        }
    }

    pub fn into_revision(self) -> Arc<ResolvedModuleRevision> {
        match self {
            FoundRevision::Direct(revision) | FoundRevision::Searched { revision, .. } => revision,
        }
    }
}

pub struct RevisionFinder<'a> {
    cache: &'a RepositoryCache,
    matcher: &'a dyn VersionMatcher,
    catalog: Option<&'a dyn ModuleLocator>,
}

impl<'a> RevisionFinder<'a> {
    pub fn new(
        cache: &'a RepositoryCache,
        matcher: &'a dyn VersionMatcher,
        catalog: Option<&'a dyn ModuleLocator>,
    ) -> Self {
        Self {
            cache,
            matcher,
            catalog,
        }
    }

    /// Find what the cache already knows for `dd`
    ///
    /// `Ok(None)` is an ordinary miss; a dynamic request whose concrete
    /// revision is not stored fails with [`CacheError::Inconsistent`].
    pub fn find_in_cache(
        &self,
        dd: &DependencyDescriptor,
        options: &CacheMetadataOptions,
        session: &ResolutionSession,
    ) -> Result<Option<FoundRevision>, ResolverError> {
        let requested = match options.forced_revision() {
            Some(revision) => dd.revision_id().with_revision(revision),
            None => dd.revision_id().clone(),
        };

        if !self.matcher.is_dynamic(&requested.revision) {
            return self.find_exact(requested, options, session);
        }

        if let Some(hit) = session.memo().get(&requested) {
            session.emit(ResolutionEvent::MemoHit {
                id: requested.clone(),
            });
            return Ok(Some(FoundRevision::Searched {
                requested,
                revision: hit,
            }));
        }

        let Some((resolved_id, resolver)) = self.locate(dd, &requested, options)? else {
            session.emit(ResolutionEvent::NotFound { id: requested });
            return Ok(None);
        };

        if let Some(hit) = session.memo().get(&resolved_id) {
            session.memo().record(requested.clone(), hit.clone());
            session.emit(ResolutionEvent::MemoHit { id: resolved_id });
            return Ok(Some(FoundRevision::Searched {
                requested,
                revision: hit,
            }));
        }

        match self.cache.lookup_module(&resolved_id, options)? {
            Lookup::Fresh(resolved) => {
                let resolved = Arc::new(resolved);
                session.memo().record(resolved_id.clone(), resolved.clone());
                session.memo().record(requested.clone(), resolved.clone());
                session.emit(ResolutionEvent::DynamicHit {
                    requested: requested.clone(),
                    resolved: resolved_id,
                });
                Ok(Some(FoundRevision::Searched {
                    requested,
                    revision: resolved,
                }))
            }
            Lookup::Stale(_) => {
                session.emit(ResolutionEvent::NotFound { id: resolved_id });
                Ok(None)
            }
            Lookup::Absent => {
                session.emit(ResolutionEvent::Inconsistent {
                    requested: requested.clone(),
                    resolved: resolved_id.clone(),
                    resolver: resolver.clone(),
                });
                Err(CacheError::Inconsistent {
                    requested,
                    resolved: resolved_id,
                    resolver,
                }
                .into())
            }
        }
    }

    fn find_exact(
        &self,
        requested: ModuleRevisionId,
        options: &CacheMetadataOptions,
        session: &ResolutionSession,
    ) -> Result<Option<FoundRevision>, ResolverError> {
        match self.cache.lookup_module(&requested, options)? {
            Lookup::Fresh(resolved) => {
                session.emit(ResolutionEvent::CacheHit { id: requested });
                Ok(Some(FoundRevision::Direct(Arc::new(resolved))))
            }
            Lookup::Stale(_) | Lookup::Absent => {
                session.emit(ResolutionEvent::NotFound { id: requested });
                Ok(None)
            }
        }
    }

    /// Concrete revision for a dynamic request and the resolver that named it
    fn locate(
        &self,
        dd: &DependencyDescriptor,
        requested: &ModuleRevisionId,
        options: &CacheMetadataOptions,
    ) -> Result<Option<(ModuleRevisionId, String)>, ResolverError> {
        let resolver = options
            .resolver_name()
            .map(str::to_string)
            .or_else(|| self.catalog.map(|c| c.name()));

        if let Some(resolver) = resolver
            && let Some(id) = self
                .cache
                .find_resolved_revision(requested, &resolver, options)?
        {
            return Ok(Some((id, resolver)));
        }

        let Some(catalog) = self.catalog else {
            return Ok(None);
        };
        let target = if requested == dd.revision_id() {
            dd.clone()
        } else {
            dd.retarget(requested.clone())
        };
        match catalog.locate(&target) {
            Ok(Some(resource)) => Ok(Some((requested.with_revision(resource.revision), catalog.name()))),
            Ok(None) | Err(ResolverError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
