//! Collaborator capabilities consumed by the resolution algorithm

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::error::ResolverError;
use crate::module::{DependencyDescriptor, ModuleRevisionId, ResolvedModuleRevision};
use crate::resolver::types::ResolvedResource;

/// Discovers which concrete revision satisfies a request
#[cfg_attr(test, automock)]
pub trait ModuleLocator: Send + Sync {
    /// Name used to scope resolved-revision mappings
    fn name(&self) -> String;

    /// Locate the best candidate for `dd`, or `None` when nothing matches
    fn locate(&self, dd: &DependencyDescriptor) -> Result<Option<ResolvedResource>, ResolverError>;
}

/// Retrieves raw descriptor bytes for a located revision
#[cfg_attr(test, automock)]
pub trait DescriptorFetcher: Send + Sync {
    fn fetch_descriptor(
        &self,
        resource: &ResolvedResource,
        id: &ModuleRevisionId,
    ) -> Result<Vec<u8>, ResolverError>;
}

/// Turns fetched bytes into a resolved revision
pub trait DescriptorParser: Send + Sync {
    fn parse(
        &self,
        bytes: &[u8],
        id: &ModuleRevisionId,
        resolver_name: &str,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolvedModuleRevision, ResolverError>;
}
