//! Artifact identity

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::module::id::ModuleRevisionId;

/// A published file of a module revision
///
/// Identity is the module revision plus (name, type, extension). The
/// publication date is carried along but never part of equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub module_revision_id: ModuleRevisionId,
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub extension: String,
    pub publication: DateTime<Utc>,
}

impl Artifact {
    pub fn new(
        module_revision_id: ModuleRevisionId,
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        extension: impl Into<String>,
        publication: DateTime<Utc>,
    ) -> Self {
        Self {
            module_revision_id,
            name: name.into(),
            artifact_type: artifact_type.into(),
            extension: extension.into(),
            publication,
        }
    }

    fn key(&self) -> (&ModuleRevisionId, &str, &str, &str) {
        (
            &self.module_revision_id,
            &self.name,
            &self.artifact_type,
            &self.extension,
        )
    }

    /// Canonical parts of the full identity, used to derive record keys
    pub(crate) fn identity_parts(&self) -> Vec<String> {
        let mut parts = self.module_revision_id.identity_parts();
        parts.push(self.name.clone());
        parts.push(self.artifact_type.clone());
        parts.push(self.extension.clone());
        parts
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}.{}({})",
            self.module_revision_id, self.name, self.extension, self.artifact_type
        )
    }
}
