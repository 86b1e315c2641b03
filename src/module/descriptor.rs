//! Dependency requests and resolved module metadata

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::module::artifact::Artifact;
use crate::module::id::ModuleRevisionId;

/// Status assigned to descriptors that do not declare one
pub const DEFAULT_STATUS: &str = "integration";

/// Type and extension of the artifact recording a descriptor's own provenance
pub const DESCRIPTOR_ARTIFACT_TYPE: &str = "descriptor";
pub const DESCRIPTOR_ARTIFACT_EXT: &str = "json";

/// A consumer's request for a module revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    revision_id: ModuleRevisionId,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    changing: bool,
    #[serde(default = "default_transitive")]
    transitive: bool,
    /// Master configuration -> dependency configurations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    configurations: BTreeMap<String, Vec<String>>,
}

fn default_transitive() -> bool {
    true
}

impl DependencyDescriptor {
    pub fn new(revision_id: ModuleRevisionId) -> Self {
        Self {
            revision_id,
            force: false,
            changing: false,
            transitive: true,
            configurations: BTreeMap::new(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_changing(mut self, changing: bool) -> Self {
        self.changing = changing;
        self
    }

    pub fn with_transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }

    pub fn with_configuration_mapping(
        mut self,
        master: impl Into<String>,
        dependency_configurations: Vec<String>,
    ) -> Self {
        self.configurations
            .insert(master.into(), dependency_configurations);
        self
    }

    /// Copy of this request targeting another revision id, flags unchanged
    pub fn retarget(&self, revision_id: ModuleRevisionId) -> Self {
        Self {
            revision_id,
            ..self.clone()
        }
    }

    pub fn revision_id(&self) -> &ModuleRevisionId {
        &self.revision_id
    }

    pub fn is_force(&self) -> bool {
        self.force
    }

    pub fn is_changing(&self) -> bool {
        self.changing
    }

    pub fn is_transitive(&self) -> bool {
        self.transitive
    }

    pub fn configurations(&self) -> &BTreeMap<String, Vec<String>> {
        &self.configurations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Configuration {
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            visibility: Visibility::Public,
            description: None,
        }
    }
}

/// An artifact declared by a descriptor, without its module identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedArtifact {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub extension: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configurations: Vec<String>,
}

/// Parsed module metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: ModuleRevisionId,
    #[serde(default = "default_status")]
    pub status: String,
    pub publication: DateTime<Utc>,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
    #[serde(default)]
    pub artifacts: Vec<PublishedArtifact>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl ModuleDescriptor {
    pub fn new(id: ModuleRevisionId, publication: DateTime<Utc>) -> Self {
        Self {
            id,
            status: default_status(),
            publication,
            configurations: vec![Configuration::public("default")],
            dependencies: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Declared artifacts bound to this descriptor's identity
    pub fn all_artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .iter()
            .map(|a| {
                Artifact::new(
                    self.id.clone(),
                    a.name.clone(),
                    a.artifact_type.clone(),
                    a.extension.clone(),
                    self.publication,
                )
            })
            .collect()
    }

    /// The artifact standing for the descriptor file itself
    pub fn metadata_artifact(&self) -> Artifact {
        Artifact::new(
            self.id.clone(),
            self.id.name(),
            DESCRIPTOR_ARTIFACT_TYPE,
            DESCRIPTOR_ARTIFACT_EXT,
            self.publication,
        )
    }
}

/// A concrete module revision bound to its metadata and provenance
///
/// Never patched in place; the cache replaces entries wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModuleRevision {
    descriptor: ModuleDescriptor,
    resolver_name: String,
    resolved_at: DateTime<Utc>,
}

impl ResolvedModuleRevision {
    pub fn new(
        descriptor: ModuleDescriptor,
        resolver_name: impl Into<String>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            descriptor,
            resolver_name: resolver_name.into(),
            resolved_at,
        }
    }

    pub fn id(&self) -> &ModuleRevisionId {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn resolver_name(&self) -> &str {
        &self.resolver_name
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}
