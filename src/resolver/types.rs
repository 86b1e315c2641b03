use std::fmt;

use crate::module::{ModuleId, ModuleRevisionId};

/// A concrete revision located by a resolver, not persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub revision: String,
    pub location: String,
    pub is_local: bool,
}

impl ResolvedResource {
    pub fn new(revision: impl Into<String>, location: impl Into<String>, is_local: bool) -> Self {
        Self {
            revision: revision.into(),
            location: location.into(),
            is_local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrganisationEntry {
    pub organisation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleEntry {
    pub module_id: ModuleId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionEntry {
    pub module_revision_id: ModuleRevisionId,
}

impl fmt::Display for OrganisationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.organisation)
    }
}

impl fmt::Display for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module_id.name)
    }
}

impl fmt::Display for RevisionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module_revision_id.revision)
    }
}
