//! Resolution with write-back
//!
//! The cache is consulted first. On a miss the live resolver locates, fetches
//! and parses the descriptor, and the result is written back so later runs
//! find it:
//! - the resolved descriptor
//! - for dynamic requests, the (request, resolver) -> revision mapping
//! - the origin of the descriptor file

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::cache::{CacheMetadataOptions, RepositoryCache};
use crate::error::ResolverError;
use crate::module::{ArtifactOrigin, DependencyDescriptor, ResolvedModuleRevision};
use crate::resolver::observer::ResolutionEvent;
use crate::resolver::session::ResolutionSession;
use crate::resolver::traits::{DescriptorFetcher, DescriptorParser, ModuleLocator};
use crate::version::matcher::VersionMatcher;

/// The collaborators of one live resolver
pub struct LiveResolver<'a> {
    pub locator: &'a dyn ModuleLocator,
    pub fetcher: &'a dyn DescriptorFetcher,
    pub parser: &'a dyn DescriptorParser,
}

/// Resolve `dd` from the cache, falling back to `live` and caching the result
///
/// Returns `Ok(None)` when neither the cache nor the live resolver knows the
/// module. Inconsistent caches and malformed descriptors are errors; nothing
/// is written for a descriptor that failed to parse.
pub fn resolve_and_cache(
    cache: &RepositoryCache,
    matcher: &dyn VersionMatcher,
    live: &LiveResolver<'_>,
    dd: &DependencyDescriptor,
    options: &CacheMetadataOptions,
    session: &ResolutionSession,
) -> Result<Option<Arc<ResolvedModuleRevision>>, ResolverError> {
    let resolver = options
        .resolver_name()
        .map(str::to_string)
        .unwrap_or_else(|| live.locator.name());
    let cache_options = options.clone().with_resolver_name(&resolver);

    if let Some(found) = cache.find_in_cache(dd, &cache_options, matcher, None, session)? {
        return Ok(Some(found.into_revision()));
    }
    if options.use_cache_only() {
        debug!("{} not cached and cache-only is set", dd.revision_id());
        return Ok(None);
    }

    let requested = match options.forced_revision() {
        Some(revision) => dd.revision_id().with_revision(revision),
        None => dd.revision_id().clone(),
    };
    let target = dd.retarget(requested.clone());

    let resource = match live.locator.locate(&target) {
        Ok(Some(resource)) => resource,
        Ok(None) | Err(ResolverError::NotFound(_)) => {
            session.emit(ResolutionEvent::NotFound { id: requested });
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let id = requested.with_revision(&resource.revision);
    let bytes = live.fetcher.fetch_descriptor(&resource, &id)?;
    let resolved = live
        .parser
        .parse(&bytes, &id, &resolver, cache.now())
        .inspect_err(|e| error!("Failed to parse descriptor of {}: {}", id, e))?;

    cache
        .save_resolved(&resolved)
        .inspect_err(|e| error!("Failed to save descriptor of {}: {}", id, e))?;

    let dynamic = matcher.is_dynamic(&requested.revision);
    if dynamic {
        cache
            .save_resolved_mapping(&requested, &resolver, &resource.revision)
            .inspect_err(|e| error!("Failed to save mapping {} -> {}: {}", requested, id, e))?;
    }

    let origin = if resource.is_local {
        ArtifactOrigin::local(&resource.location)
    } else {
        ArtifactOrigin::remote(&resource.location)
    };
    cache
        .save_origin(&resolved.descriptor().metadata_artifact(), &origin)
        .inspect_err(|e| error!("Failed to save origin of {}: {}", id, e))?;

    info!("Cached {} from {}", id, resolver);
    let resolved = Arc::new(resolved);
    session.memo().record(id.clone(), resolved.clone());
    if dynamic {
        session.memo().record(requested, resolved.clone());
    }
    session.emit(ResolutionEvent::Resolved { id, resolver });
    Ok(Some(resolved))
}
