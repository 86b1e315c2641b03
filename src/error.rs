use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::module::ModuleRevisionId;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error while {context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache record {}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache record {} describes {found} instead of {expected}", path.display())]
    Mismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Invalid {token} value {value:?}: cannot be used as a cache path segment")]
    InvalidKey { token: String, value: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error(
        "Inconsistent cache: {resolver} lists {resolved} for {requested} but no descriptor is stored for it; clean the cache and resolve again"
    )]
    Inconsistent {
        requested: ModuleRevisionId,
        resolved: ModuleRevisionId,
        resolver: String,
    },
}

impl CacheError {
    pub fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_inconsistent(&self) -> bool {
        matches!(self, CacheError::Inconsistent { .. })
    }
}

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Malformed descriptor for {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("Refusing to overwrite existing file {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ResolverError {
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, ResolverError::Cache(e) if e.is_inconsistent())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
