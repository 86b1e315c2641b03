//! Artifact provenance records, one per full artifact identity

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::atomic::{self, KeyLocks};
use crate::cache::layout::CacheLayout;
use crate::error::CacheError;
use crate::module::{Artifact, ArtifactOrigin};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OriginRecord {
    artifact: Artifact,
    origin: ArtifactOrigin,
}

#[derive(Debug)]
pub struct OriginStore {
    root: PathBuf,
    layout: CacheLayout,
    locks: Arc<KeyLocks>,
}

impl OriginStore {
    pub fn new(root: PathBuf, layout: CacheLayout, locks: Arc<KeyLocks>) -> Self {
        Self { root, layout, locks }
    }

    /// Overwrite the origin recorded for `artifact`
    pub fn put(&self, artifact: &Artifact, origin: &ArtifactOrigin) -> Result<(), CacheError> {
        let path = self.layout.origin_path(&self.root, artifact)?;
        let record = OriginRecord {
            artifact: artifact.clone(),
            origin: origin.clone(),
        };
        self.locks
            .with_lock(&path, || atomic::write_json_atomic(&path, &record))?;
        debug!("Saved origin of {}", artifact);
        Ok(())
    }

    /// Origin recorded for `artifact`, or [`ArtifactOrigin::Unknown`]
    pub fn get(&self, artifact: &Artifact) -> Result<ArtifactOrigin, CacheError> {
        let path = self.layout.origin_path(&self.root, artifact)?;
        match atomic::read_json::<OriginRecord>(&path)? {
            Some(record) if &record.artifact == artifact => Ok(record.origin),
            Some(_) => {
                warn!("Ignoring origin at {} stored for another artifact", path.display());
                Ok(ArtifactOrigin::Unknown)
            }
            None => Ok(ArtifactOrigin::Unknown),
        }
    }
}
