//! One record per concrete module revision

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::atomic::{self, KeyLocks};
use crate::cache::layout::CacheLayout;
use crate::error::CacheError;
use crate::module::{ModuleRevisionId, ResolvedModuleRevision};

#[derive(Debug)]
pub struct DescriptorStore {
    root: PathBuf,
    layout: CacheLayout,
    locks: Arc<KeyLocks>,
}

impl DescriptorStore {
    pub fn new(root: PathBuf, layout: CacheLayout, locks: Arc<KeyLocks>) -> Self {
        Self { root, layout, locks }
    }

    pub fn path(&self, id: &ModuleRevisionId) -> Result<PathBuf, CacheError> {
        self.layout.descriptor_path(&self.root, id)
    }

    /// Replace the stored record for the revision's id
    pub fn save(&self, resolved: &ResolvedModuleRevision) -> Result<PathBuf, CacheError> {
        let path = self.path(resolved.id())?;
        self.locks
            .with_lock(&path, || atomic::write_json_atomic(&path, resolved))?;
        debug!("Saved descriptor for {} at {}", resolved.id(), path.display());
        Ok(path)
    }

    /// Load the record stored for `id`
    ///
    /// With `validate`, a record describing another id fails with
    /// [`CacheError::Mismatch`] instead of being returned.
    pub fn load(
        &self,
        id: &ModuleRevisionId,
        validate: bool,
    ) -> Result<Option<ResolvedModuleRevision>, CacheError> {
        let path = self.path(id)?;
        let Some(resolved) = atomic::read_json::<ResolvedModuleRevision>(&path)? else {
            return Ok(None);
        };

        if resolved.id() != id {
            if validate {
                return Err(CacheError::Mismatch {
                    path,
                    expected: id.to_string(),
                    found: resolved.id().to_string(),
                });
            }
            warn!(
                "Descriptor at {} describes {} instead of {}",
                path.display(),
                resolved.id(),
                id
            );
        }
        Ok(Some(resolved))
    }

    pub fn remove(&self, id: &ModuleRevisionId) -> Result<bool, CacheError> {
        let path = self.path(id)?;
        self.locks.with_lock(&path, || atomic::remove(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleDescriptor, ModuleId};
    use chrono::Utc;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> DescriptorStore {
        DescriptorStore::new(
            temp_dir.path().to_path_buf(),
            CacheLayout::default(),
            Arc::new(KeyLocks::new()),
        )
    }

    fn resolved(id: ModuleRevisionId) -> ResolvedModuleRevision {
        ResolvedModuleRevision::new(ModuleDescriptor::new(id, Utc::now()), "resolver", Utc::now())
    }

    fn mrid(revision: &str) -> ModuleRevisionId {
        ModuleRevisionId::new(ModuleId::new("org", "module"), revision)
    }

    #[test]
    fn save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let rmr = resolved(mrid("1.1"));

        store.save(&rmr).unwrap();

        assert_eq!(store.load(&mrid("1.1"), true).unwrap(), Some(rmr));
        assert_eq!(store.load(&mrid("1.2"), true).unwrap(), None);
    }

    #[test]
    fn branches_are_stored_independently() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let trunk = mrid("1.1").with_branch("trunk");

        store.save(&resolved(trunk.clone())).unwrap();

        assert!(store.load(&mrid("1.1"), true).unwrap().is_none());
        assert!(store.load(&trunk, true).unwrap().is_some());
    }

    #[test]
    fn validate_rejects_foreign_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.save(&resolved(mrid("2.0"))).unwrap();
        let target = store.path(&mrid("1.0")).unwrap();
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::copy(store.path(&mrid("2.0")).unwrap(), &target).unwrap();

        let err = store.load(&mrid("1.0"), true).unwrap_err();
        assert!(matches!(err, CacheError::Mismatch { .. }));
        assert!(store.load(&mrid("1.0"), false).unwrap().is_some());
    }

    #[test]
    fn remove_deletes_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.save(&resolved(mrid("1.1"))).unwrap();

        assert!(store.remove(&mrid("1.1")).unwrap());
        assert!(!store.remove(&mrid("1.1")).unwrap());
        assert!(store.load(&mrid("1.1"), false).unwrap().is_none());
    }
}
