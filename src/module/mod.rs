//! Module data model
//! - id.rs: ModuleId and ModuleRevisionId
//! - descriptor.rs: DependencyDescriptor, ModuleDescriptor, ResolvedModuleRevision
//! - artifact.rs: Artifact identity
//! - origin.rs: ArtifactOrigin provenance records

pub mod artifact;
pub mod descriptor;
pub mod id;
pub mod origin;

pub use artifact::Artifact;
pub use descriptor::{
    Configuration, DEFAULT_STATUS, DESCRIPTOR_ARTIFACT_EXT, DESCRIPTOR_ARTIFACT_TYPE,
    DependencyDescriptor, ModuleDescriptor, PublishedArtifact, ResolvedModuleRevision, Visibility,
};
pub use id::{ModuleId, ModuleRevisionId};
pub use origin::ArtifactOrigin;
