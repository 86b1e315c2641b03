//! Artifact presence check against the cache root
//!
//! Reconciliation never transfers anything. Missing artifacts are reported as
//! failed so a live resolver can fetch them.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::cache::layout::CacheLayout;
use crate::error::CacheError;
use crate::module::Artifact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    NotFound,
    Io(String),
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    /// Already present, nothing transferred
    Satisfied { local_file: PathBuf, size: u64 },
    Failed(FailureReason),
}

impl ArtifactOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ArtifactOutcome::Satisfied { .. })
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            ArtifactOutcome::Satisfied { size, .. } => Some(*size),
            ArtifactOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDownloadReport {
    pub artifact: Artifact,
    pub outcome: ArtifactOutcome,
}

/// Per-artifact outcomes in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    reports: Vec<ArtifactDownloadReport>,
}

impl DownloadReport {
    pub fn get(&self, artifact: &Artifact) -> Option<&ArtifactDownloadReport> {
        self.reports.iter().find(|r| &r.artifact == artifact)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ArtifactDownloadReport> {
        self.reports.iter().filter(|r| !r.outcome.is_satisfied())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactDownloadReport> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

fn check(layout: &CacheLayout, root: &Path, artifact: &Artifact) -> ArtifactOutcome {
    let path = match layout.artifact_path(root, artifact) {
        Ok(path) => path,
        Err(CacheError::InvalidKey { token, value }) => {
            return ArtifactOutcome::Failed(FailureReason::InvalidKey(format!("{}={:?}", token, value)));
        }
        Err(e) => return ArtifactOutcome::Failed(FailureReason::Io(e.to_string())),
    };

    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => ArtifactOutcome::Satisfied {
            local_file: path,
            size: meta.len(),
        },
        Ok(_) => ArtifactOutcome::Failed(FailureReason::NotFound),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ArtifactOutcome::Failed(FailureReason::NotFound)
        }
        Err(e) => ArtifactOutcome::Failed(FailureReason::Io(e.to_string())),
    }
}

/// Check every artifact independently; failures never stop the batch
pub fn reconcile(layout: &CacheLayout, root: &Path, artifacts: &[Artifact]) -> DownloadReport {
    let reports = artifacts
        .iter()
        .map(|artifact| {
            let outcome = check(layout, root, artifact);
            debug!("Reconciled {}: {:?}", artifact, outcome);
            ArtifactDownloadReport {
                artifact: artifact.clone(),
                outcome,
            }
        })
        .collect();
    DownloadReport { reports }
}
