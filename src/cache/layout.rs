//! On-disk layout of the cache root
//!
//! Descriptors and artifacts follow configurable templates so the cache root
//! can double as a file repository. Mapping and origin records live under
//! hidden directories keyed by a digest of their full identity, which keeps
//! near-identical identities from sharing a file.

use std::path::{Path, PathBuf};

use crate::cache::pattern::{
    self, TOKEN_ARTIFACT, TOKEN_EXT, TOKEN_KEY, TOKEN_MODULE, TOKEN_ORGANISATION,
    TOKEN_QUALIFIER, TOKEN_REVISION, TOKEN_TYPE, Tokens,
};
use crate::error::CacheError;
use crate::module::id::digest_parts;
use crate::module::{Artifact, ModuleRevisionId};

pub const DEFAULT_DESCRIPTOR_PATTERN: &str =
    "[organisation]/[module]/[revision]/module(-[qualifier]).json";
pub const DEFAULT_ARTIFACT_PATTERN: &str =
    "[organisation]/[module]/[revision]/[type]s/[artifact](-[qualifier]).[ext]";

const MAPPING_PATTERN: &str = ".resolved/[organisation]/[module]/[key].json";
const ORIGIN_PATTERN: &str = ".origins/[organisation]/[module]/[revision]/[key].json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    pub descriptor_pattern: String,
    pub artifact_pattern: String,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self {
            descriptor_pattern: DEFAULT_DESCRIPTOR_PATTERN.to_string(),
            artifact_pattern: DEFAULT_ARTIFACT_PATTERN.to_string(),
        }
    }
}

impl CacheLayout {
    pub fn descriptor_path(&self, root: &Path, id: &ModuleRevisionId) -> Result<PathBuf, CacheError> {
        pattern::render(root, &self.descriptor_pattern, &module_tokens(id))
    }

    pub fn artifact_path(&self, root: &Path, artifact: &Artifact) -> Result<PathBuf, CacheError> {
        pattern::render(root, &self.artifact_pattern, &artifact_tokens(artifact))
    }

    /// Path of the (dynamic request, resolver) -> revision record
    pub fn mapping_path(
        &self,
        root: &Path,
        requested: &ModuleRevisionId,
        resolver_name: &str,
    ) -> Result<PathBuf, CacheError> {
        let mut parts = requested.identity_parts();
        parts.push(resolver_name.to_string());
        let mut tokens = module_tokens(requested);
        tokens.insert(TOKEN_KEY, digest_parts(parts.iter().map(String::as_str)));
        pattern::render(root, MAPPING_PATTERN, &tokens)
    }

    pub fn origin_path(&self, root: &Path, artifact: &Artifact) -> Result<PathBuf, CacheError> {
        let parts = artifact.identity_parts();
        let mut tokens = module_tokens(&artifact.module_revision_id);
        tokens.insert(TOKEN_KEY, digest_parts(parts.iter().map(String::as_str)));
        pattern::render(root, ORIGIN_PATTERN, &tokens)
    }
}

pub fn module_tokens(id: &ModuleRevisionId) -> Tokens {
    let mut tokens = Tokens::new();
    tokens.insert(TOKEN_ORGANISATION, id.organisation().to_string());
    tokens.insert(TOKEN_MODULE, id.name().to_string());
    tokens.insert(TOKEN_REVISION, id.revision.clone());
    tokens.insert(TOKEN_QUALIFIER, id.qualifier().unwrap_or_default());
    tokens
}

pub fn artifact_tokens(artifact: &Artifact) -> Tokens {
    let mut tokens = module_tokens(&artifact.module_revision_id);
    tokens.insert(TOKEN_ARTIFACT, artifact.name.clone());
    tokens.insert(TOKEN_TYPE, artifact.artifact_type.clone());
    tokens.insert(TOKEN_EXT, artifact.extension.clone());
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleId;
    use chrono::Utc;

    fn mrid(revision: &str) -> ModuleRevisionId {
        ModuleRevisionId::new(ModuleId::new("org", "module"), revision)
    }

    #[test]
    fn descriptor_path_is_readable_for_plain_ids() {
        let path = CacheLayout::default()
            .descriptor_path(Path::new("/cache"), &mrid("1.1"))
            .unwrap();
        assert_eq!(path, Path::new("/cache/org/module/1.1/module.json"));
    }

    #[test]
    fn descriptor_path_separates_branches() {
        let layout = CacheLayout::default();
        let plain = layout.descriptor_path(Path::new("/c"), &mrid("1.1")).unwrap();
        let trunk = layout
            .descriptor_path(Path::new("/c"), &mrid("1.1").with_branch("trunk"))
            .unwrap();

        assert_ne!(plain, trunk);
        assert_eq!(plain.parent(), trunk.parent());
    }

    #[test]
    fn artifact_path_uses_type_directory() {
        let artifact = Artifact::new(mrid("1.1"), "module", "jar", "jar", Utc::now());
        let path = CacheLayout::default()
            .artifact_path(Path::new("/cache"), &artifact)
            .unwrap();
        assert_eq!(path, Path::new("/cache/org/module/1.1/jars/module.jar"));
    }

    #[test]
    fn mapping_path_depends_on_resolver() {
        let layout = CacheLayout::default();
        let latest = mrid("latest.integration");
        let a = layout.mapping_path(Path::new("/c"), &latest, "resolver1").unwrap();
        let b = layout.mapping_path(Path::new("/c"), &latest, "resolver2").unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("/c/.resolved/org/module"));
    }

    #[test]
    fn origin_path_does_not_collide_on_name_and_extension_split() {
        let layout = CacheLayout::default();
        let a = Artifact::new(mrid("1.0"), "a.b", "jar", "c", Utc::now());
        let b = Artifact::new(mrid("1.0"), "a", "jar", "b.c", Utc::now());

        assert_ne!(
            layout.origin_path(Path::new("/c"), &a).unwrap(),
            layout.origin_path(Path::new("/c"), &b).unwrap()
        );
    }

    #[test]
    fn mapping_path_accepts_range_constraints() {
        let path = CacheLayout::default()
            .mapping_path(Path::new("/c"), &mrid("[1.0,2.0)"), "local")
            .unwrap();
        assert!(path.starts_with("/c/.resolved/org/module"));
    }
}
