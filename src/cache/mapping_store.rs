//! (dynamic request, resolver) -> concrete revision records

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::atomic::{self, KeyLocks};
use crate::cache::layout::CacheLayout;
use crate::error::CacheError;
use crate::module::ModuleRevisionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMapping {
    pub requested: ModuleRevisionId,
    pub resolver: String,
    pub revision: String,
    pub saved_at: DateTime<Utc>,
}

impl ResolvedMapping {
    /// The requested id with the mapped revision substituted
    pub fn resolved_id(&self) -> ModuleRevisionId {
        self.requested.with_revision(&self.revision)
    }
}

#[derive(Debug)]
pub struct MappingStore {
    root: PathBuf,
    layout: CacheLayout,
    locks: Arc<KeyLocks>,
}

impl MappingStore {
    pub fn new(root: PathBuf, layout: CacheLayout, locks: Arc<KeyLocks>) -> Self {
        Self { root, layout, locks }
    }

    pub fn save(&self, mapping: &ResolvedMapping) -> Result<(), CacheError> {
        let path = self
            .layout
            .mapping_path(&self.root, &mapping.requested, &mapping.resolver)?;
        self.locks
            .with_lock(&path, || atomic::write_json_atomic(&path, mapping))?;
        debug!(
            "Saved mapping {} -> {} for resolver {}",
            mapping.requested, mapping.revision, mapping.resolver
        );
        Ok(())
    }

    pub fn load(
        &self,
        requested: &ModuleRevisionId,
        resolver: &str,
    ) -> Result<Option<ResolvedMapping>, CacheError> {
        let path = self.layout.mapping_path(&self.root, requested, resolver)?;
        let Some(mapping) = atomic::read_json::<ResolvedMapping>(&path)? else {
            return Ok(None);
        };
        if &mapping.requested != requested || mapping.resolver != resolver {
            warn!("Ignoring mapping at {} stored for another request", path.display());
            return Ok(None);
        }
        Ok(Some(mapping))
    }
}
