use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::Deserialize;

use crate::cache::freshness::{DEFAULT_TTL_MS, FreshnessPolicy, TtlRule as PolicyRule};
use crate::cache::layout::{CacheLayout, DEFAULT_ARTIFACT_PATTERN, DEFAULT_DESCRIPTOR_PATTERN};
use crate::cache::options::CacheMetadataOptions;
use crate::error::ConfigError;

const APP_NAME: &str = "modcache";

/// Cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Cache root directory
    pub root: PathBuf,
    /// Default time-to-live of cached entries in milliseconds
    pub ttl_ms: i64,
    pub check_ttl: bool,
    pub use_cache_only: bool,
    pub validate: bool,
    pub descriptor_pattern: String,
    pub artifact_pattern: String,
    pub ttl_rules: Vec<TtlRule>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: cache_dir(),
            ttl_ms: DEFAULT_TTL_MS,
            check_ttl: true,
            use_cache_only: false,
            validate: false,
            descriptor_pattern: DEFAULT_DESCRIPTOR_PATTERN.to_string(),
            artifact_pattern: DEFAULT_ARTIFACT_PATTERN.to_string(),
            ttl_rules: Vec::new(),
        }
    }
}

/// Per-module TTL override; `*` matches any value
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TtlRule {
    #[serde(default = "any")]
    pub organisation: String,
    #[serde(default = "any")]
    pub module: String,
    pub ttl_ms: i64,
}

fn any() -> String {
    crate::cache::freshness::ANY.to_string()
}

impl CacheConfig {
    pub fn to_layout(&self) -> CacheLayout {
        CacheLayout {
            descriptor_pattern: self.descriptor_pattern.clone(),
            artifact_pattern: self.artifact_pattern.clone(),
        }
    }

    pub fn to_freshness_policy(&self) -> FreshnessPolicy {
        self.ttl_rules.iter().fold(
            FreshnessPolicy::new(TimeDelta::milliseconds(self.ttl_ms)),
            |policy, rule| {
                policy.with_rule(PolicyRule {
                    organisation: rule.organisation.clone(),
                    module: rule.module.clone(),
                    ttl: TimeDelta::milliseconds(rule.ttl_ms),
                })
            },
        )
    }

    /// Lookup options carrying the configured defaults
    pub fn to_options(&self) -> CacheMetadataOptions {
        CacheMetadataOptions::new()
            .with_check_ttl(self.check_ttl)
            .with_use_cache_only(self.use_cache_only)
            .with_validate(self.validate)
    }
}

/// Load configuration from a JSON file; missing fields take defaults
pub fn load_config(path: &Path) -> Result<CacheConfig, ConfigError> {
    let content = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the default cache root.
/// Uses $XDG_CACHE_HOME/modcache if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/modcache,
/// or ./modcache if neither is available.
pub fn cache_dir() -> PathBuf {
    dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir(), ".cache")
}

/// Returns the data directory holding the log file.
pub fn data_dir() -> PathBuf {
    dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir(), ".local/share")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("modcache.log")
}

fn dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, fallback: &str) -> PathBuf {
    let base = xdg_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(fallback)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}
