//! Atomic record publication and per-key write serialization
//!
//! Every record is written to a hidden temp file beside its target and then
//! renamed over it, so readers see either the old or the new content. Writers
//! for the same path are serialized in-process by [`KeyLocks`]; writers for
//! different paths never wait on each other.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CacheError;

const TEMP_PREFIX: &str = ".tmp-";

/// Lock table keyed by record path
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`
    pub fn with_lock<T, E: From<CacheError>>(
        &self,
        key: &Path,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let slot = {
            let mut locks = self.locks.lock().map_err(|_| CacheError::LockPoisoned)?;
            locks.entry(key.to_path_buf()).or_default().clone()
        };

        let result = {
            let _guard = slot.lock().map_err(|_| CacheError::LockPoisoned)?;
            f()
        };

        // Drop the entry once no other writer holds or waits for it
        let mut locks = self.locks.lock().map_err(|_| CacheError::LockPoisoned)?;
        if Arc::strong_count(&slot) == 2 {
            locks.remove(key);
        }
        drop(slot);
        drop(locks);

        result
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_default()
    }
}

fn ensure_parent(path: &Path) -> Result<&Path, CacheError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| CacheError::io("creating directory", parent, e))?;
    Ok(parent)
}

/// Write through a temp file and rename it onto `path`
///
/// Without `overwrite` the rename refuses an existing target, including one
/// created by another process meanwhile, and `Ok(false)` is returned.
fn publish(
    path: &Path,
    overwrite: bool,
    fill: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> Result<bool, CacheError> {
    let parent = ensure_parent(path)?;
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| CacheError::io("creating temp file in", parent, e))?;

    fill(temp.as_file_mut()).map_err(|e| CacheError::io("writing", temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CacheError::io("syncing", temp.path(), e))?;

    // On failure the temp file is removed when the error drops it
    let persisted = if overwrite {
        temp.persist(path)
    } else {
        temp.persist_noclobber(path)
    };
    match persisted {
        Ok(_) => {
            debug!("Published {}", path.display());
            Ok(true)
        }
        Err(e) if !overwrite && e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!("Not replacing existing {}", path.display());
            Ok(false)
        }
        Err(e) => Err(CacheError::io("publishing", path, e.error)),
    }
}

/// Serialize `value` as JSON and publish it at `path`
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| CacheError::MalformedRecord {
        path: path.to_path_buf(),
        source,
    })?;
    publish(path, true, |file| file.write_all(&bytes)).map(|_| ())
}

/// Copy `source` to `path` through a temp file
///
/// Returns the copied size, or `None` when `overwrite` is off and `path`
/// already exists.
pub fn copy_atomic(source: &Path, path: &Path, overwrite: bool) -> Result<Option<u64>, CacheError> {
    let mut input = File::open(source).map_err(|e| CacheError::io("opening", source, e))?;
    let mut copied = 0;
    let published = publish(path, overwrite, |file| {
        copied = std::io::copy(&mut input, file)?;
        Ok(())
    })?;
    Ok(published.then_some(copied))
}

/// Read a JSON record; a missing file is `Ok(None)`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::io("reading", path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CacheError::MalformedRecord {
            path: path.to_path_buf(),
            source,
        })
}

/// Remove a record; a missing file is not an error
pub fn remove(path: &Path) -> Result<bool, CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io("removing", path, e)),
    }
}
