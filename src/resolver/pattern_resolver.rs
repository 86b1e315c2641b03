//! Resolver over a directory tree laid out by file patterns
//!
//! Pattern state is not owned here. A [`PatternProvider`] hands out the
//! current [`PatternSet`] on every operation, which lets the local store
//! derive its patterns lazily from the cache root.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::atomic::{self, KeyLocks};
use crate::cache::layout::{CacheLayout, artifact_tokens, module_tokens};
use crate::cache::pattern::{
    self, TOKEN_MODULE, TOKEN_ORGANISATION, TOKEN_QUALIFIER, TOKEN_REVISION, Tokens,
};
use crate::error::{CacheError, ResolverError};
use crate::module::{
    Artifact, DESCRIPTOR_ARTIFACT_TYPE, DependencyDescriptor, ModuleDescriptor, ModuleId,
    ModuleRevisionId,
};
use crate::resolver::traits::{DescriptorFetcher, ModuleLocator};
use crate::resolver::types::{ModuleEntry, OrganisationEntry, ResolvedResource, RevisionEntry};
use crate::version::matcher::VersionMatcher;
use crate::version::revision::sort_newest_first;

/// Patterns anchored at a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    pub root: PathBuf,
    pub descriptor_patterns: Vec<String>,
    pub artifact_patterns: Vec<String>,
}

impl PatternSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            descriptor_patterns: Vec::new(),
            artifact_patterns: Vec::new(),
        }
    }

    pub fn with_descriptor_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.descriptor_patterns.push(pattern.into());
        self
    }

    pub fn with_artifact_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.artifact_patterns.push(pattern.into());
        self
    }

    /// Patterns a cache with `layout` uses under `root`
    pub fn derive(root: &Path, layout: &CacheLayout) -> Self {
        Self::new(root)
            .with_descriptor_pattern(layout.descriptor_pattern.clone())
            .with_artifact_pattern(layout.artifact_pattern.clone())
    }

    fn for_artifact(&self, artifact: &Artifact) -> &[String] {
        if artifact.artifact_type == DESCRIPTOR_ARTIFACT_TYPE {
            &self.descriptor_patterns
        } else {
            &self.artifact_patterns
        }
    }

    fn all(&self) -> impl Iterator<Item = &String> {
        self.descriptor_patterns.iter().chain(&self.artifact_patterns)
    }
}

pub trait PatternProvider: Send + Sync {
    fn patterns(&self) -> Result<PatternSet, CacheError>;
}

/// Patterns that never change
#[derive(Debug, Clone)]
pub struct FixedPatterns(pub PatternSet);

impl PatternProvider for FixedPatterns {
    fn patterns(&self) -> Result<PatternSet, CacheError> {
        Ok(self.0.clone())
    }
}

pub struct PatternResolver<P> {
    name: String,
    provider: P,
    matcher: Arc<dyn VersionMatcher>,
    locks: KeyLocks,
}

impl<P: PatternProvider> PatternResolver<P> {
    pub fn new(name: impl Into<String>, provider: P, matcher: Arc<dyn VersionMatcher>) -> Self {
        Self {
            name: name.into(),
            provider,
            matcher,
            locks: KeyLocks::new(),
        }
    }

    pub fn resolver_name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn patterns(&self) -> Result<PatternSet, CacheError> {
        self.provider.patterns()
    }

    pub fn exists(&self, artifact: &Artifact) -> Result<bool, ResolverError> {
        let set = self.patterns()?;
        let tokens = artifact_tokens(artifact);
        for template in set.for_artifact(artifact) {
            if pattern::render(&set.root, template, &tokens)?.is_file() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Copy `source` to where `artifact` belongs
    ///
    /// Fails with [`ResolverError::AlreadyExists`] if the target exists and
    /// `overwrite` is not set.
    pub fn publish(&self, artifact: &Artifact, source: &Path, overwrite: bool) -> Result<PathBuf, ResolverError> {
        let set = self.patterns()?;
        let Some(template) = set.for_artifact(artifact).first() else {
            return Err(ResolverError::NotFound(format!(
                "no pattern to publish {} with {}",
                artifact, self.name
            )));
        };
        let target = pattern::render(&set.root, template, &artifact_tokens(artifact))?;

        self.locks.with_lock(&target, || {
            match atomic::copy_atomic(source, &target, overwrite)? {
                Some(size) => {
                    info!("Published {} ({} bytes) to {}", artifact, size, target.display());
                    Ok(target.clone())
                }
                None => Err(ResolverError::AlreadyExists(target.clone())),
            }
        })
    }

    fn list_values(&self, target: &str, fixed: &Tokens) -> Result<BTreeSet<String>, ResolverError> {
        let set = self.patterns()?;
        let mut values = BTreeSet::new();
        for template in set.all() {
            values.extend(pattern::list_token_values(&set.root, template, target, fixed)?);
        }
        Ok(values)
    }

    pub fn list_organisations(&self) -> Result<Vec<OrganisationEntry>, ResolverError> {
        Ok(self
            .list_values(TOKEN_ORGANISATION, &Tokens::new())?
            .into_iter()
            .map(|organisation| OrganisationEntry { organisation })
            .collect())
    }

    pub fn list_modules(&self, organisation: &str) -> Result<Vec<ModuleEntry>, ResolverError> {
        let mut fixed = Tokens::new();
        fixed.insert(TOKEN_ORGANISATION, organisation.to_string());
        Ok(self
            .list_values(TOKEN_MODULE, &fixed)?
            .into_iter()
            .map(|name| ModuleEntry {
                module_id: ModuleId::new(organisation, name),
            })
            .collect())
    }

    /// Revisions present for `module`, oldest first
    pub fn list_revisions(&self, module: &ModuleId) -> Result<Vec<RevisionEntry>, ResolverError> {
        let mut revisions: Vec<String> = self.revisions_of(module)?;
        revisions.reverse();
        Ok(revisions
            .into_iter()
            .map(|revision| RevisionEntry {
                module_revision_id: ModuleRevisionId::new(module.clone(), revision),
            })
            .collect())
    }

    fn revisions_of(&self, module: &ModuleId) -> Result<Vec<String>, ResolverError> {
        let mut fixed = Tokens::new();
        fixed.insert(TOKEN_ORGANISATION, module.organisation.clone());
        fixed.insert(TOKEN_MODULE, module.name.clone());
        let mut revisions: Vec<String> = self.list_values(TOKEN_REVISION, &fixed)?.into_iter().collect();
        sort_newest_first(&mut revisions);
        Ok(revisions)
    }

    /// Revisions accepted by the request's constraint, newest first
    pub fn list_candidates(&self, dd: &DependencyDescriptor) -> Result<Vec<String>, ResolverError> {
        let requested = dd.revision_id();
        let constraint = requested.revision.as_str();
        let candidates: Vec<String> = self
            .revisions_of(&requested.module_id)?
            .into_iter()
            .filter(|revision| !self.matcher.is_dynamic(revision))
            .filter(|revision| self.matcher.accept(constraint, revision))
            .collect();
        debug!("{} candidates for {} in {}: {:?}", candidates.len(), requested, self.name, candidates);
        Ok(candidates)
    }

    /// First existing descriptor file for `id`
    pub fn descriptor_file(&self, id: &ModuleRevisionId) -> Result<Option<PathBuf>, ResolverError> {
        let set = self.patterns()?;
        let tokens = module_tokens(id);
        for template in &set.descriptor_patterns {
            let path = pattern::render(&set.root, template, &tokens)?;
            if path.is_file() {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Pick the newest candidate for `dd` that `accept` approves
    ///
    /// `accept` is only asked when the constraint depends on descriptor
    /// content.
    pub fn select(
        &self,
        dd: &DependencyDescriptor,
        accept: &dyn Fn(&ModuleRevisionId) -> Result<bool, ResolverError>,
    ) -> Result<Option<ResolvedResource>, ResolverError> {
        let requested = dd.revision_id();
        let constraint = requested.revision.as_str();

        if !self.matcher.is_dynamic(constraint) {
            return Ok(self
                .descriptor_file(requested)?
                .map(|path| ResolvedResource::new(constraint, path.display().to_string(), true)));
        }

        let needs_descriptor = self.matcher.needs_descriptor(constraint);
        for revision in self.list_candidates(dd)? {
            let id = requested.with_revision(&revision);
            if self.held_by_other_variant(&id)? {
                debug!("{} only holds descriptors of other variants of {}", revision, requested);
                continue;
            }
            if needs_descriptor && !accept(&id)? {
                continue;
            }
            let location = match self.descriptor_file(&id)? {
                Some(path) => path,
                None => {
                    let set = self.patterns()?;
                    match set.descriptor_patterns.first() {
                        Some(template) => pattern::render(&set.root, template, &module_tokens(&id))?,
                        None => set.root.clone(),
                    }
                }
            };
            return Ok(Some(ResolvedResource::new(revision, location.display().to_string(), true)));
        }
        Ok(None)
    }

    /// Whether the revision directory of `id` only holds descriptors for other
    /// branches or extra attributes
    fn held_by_other_variant(&self, id: &ModuleRevisionId) -> Result<bool, ResolverError> {
        if self.descriptor_file(id)?.is_some() {
            return Ok(false);
        }
        let plain = ModuleRevisionId::new(id.module_id.clone(), id.revision.clone());
        if plain != *id && self.descriptor_file(&plain)?.is_some() {
            return Ok(true);
        }

        let set = self.patterns()?;
        let mut fixed = Tokens::new();
        fixed.insert(TOKEN_ORGANISATION, id.organisation().to_string());
        fixed.insert(TOKEN_MODULE, id.name().to_string());
        fixed.insert(TOKEN_REVISION, id.revision.clone());
        for template in &set.descriptor_patterns {
            if !pattern::list_token_values(&set.root, template, TOKEN_QUALIFIER, &fixed)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_descriptor(&self, id: &ModuleRevisionId) -> Result<Option<ModuleDescriptor>, ResolverError> {
        let Some(path) = self.descriptor_file(id)? else {
            return Ok(None);
        };
        let bytes = fs::read(&path).map_err(|e| CacheError::io("reading", &path, e))?;
        match serde_json::from_slice(&bytes) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) => {
                warn!("Skipping unreadable descriptor {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

impl<P: PatternProvider> ModuleLocator for PatternResolver<P> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn locate(&self, dd: &DependencyDescriptor) -> Result<Option<ResolvedResource>, ResolverError> {
        let constraint = dd.revision_id().revision.clone();
        self.select(dd, &|id: &ModuleRevisionId| {
            Ok(self
                .read_descriptor(id)?
                .is_some_and(|descriptor| self.matcher.accept_descriptor(&constraint, &descriptor)))
        })
    }
}

impl<P: PatternProvider> DescriptorFetcher for PatternResolver<P> {
    fn fetch_descriptor(
        &self,
        resource: &ResolvedResource,
        id: &ModuleRevisionId,
    ) -> Result<Vec<u8>, ResolverError> {
        let path = Path::new(&resource.location);
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResolverError::NotFound(format!("{} in {}", id, self.name)))
            }
            Err(e) => Err(CacheError::io("reading", path, e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::DESCRIPTOR_ARTIFACT_EXT;
    use crate::version::matchers::ChainVersionMatcher;
    use chrono::Utc;
    use rstest::rstest;
    use tempfile::TempDir;

    const DESCRIPTORS: &str = "[organisation]/[module]/[revision]/descriptor.json";
    const ARTIFACTS: &str = "[organisation]/[module]/[revision]/[artifact].[ext]";

    fn resolver(root: &Path) -> PatternResolver<FixedPatterns> {
        let set = PatternSet::new(root)
            .with_descriptor_pattern(DESCRIPTORS)
            .with_artifact_pattern(ARTIFACTS);
        PatternResolver::new("repo", FixedPatterns(set), Arc::new(ChainVersionMatcher::default()))
    }

    fn mrid(revision: &str) -> ModuleRevisionId {
        ModuleRevisionId::new(ModuleId::new("org", "module"), revision)
    }

    fn write_descriptor(root: &Path, revision: &str, status: &str) {
        let mut descriptor = ModuleDescriptor::new(mrid(revision), Utc::now());
        descriptor.status = status.to_string();
        let path = root.join("org/module").join(revision).join("descriptor.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_vec(&descriptor).unwrap()).unwrap();
    }

    #[test]
    fn publish_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir.path().join("repo"));
        let source = temp_dir.path().join("module.jar");
        fs::write(&source, b"jar").unwrap();
        let artifact = Artifact::new(mrid("1.0"), "module", "jar", "jar", Utc::now());

        let target = resolver.publish(&artifact, &source, false).unwrap();
        assert!(resolver.exists(&artifact).unwrap());

        let err = resolver.publish(&artifact, &source, false).unwrap_err();
        assert!(matches!(err, ResolverError::AlreadyExists(ref p) if p == &target));
        assert_eq!(resolver.publish(&artifact, &source, true).unwrap(), target);
    }

    #[test]
    fn publish_keeps_a_file_another_writer_placed_first() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("repo");
        let resolver = resolver(&repo);
        let source = temp_dir.path().join("module.jar");
        fs::write(&source, b"ours").unwrap();
        let artifact = Artifact::new(mrid("1.0"), "module", "jar", "jar", Utc::now());
        // Written behind the resolver's back, as a second process sharing the root would
        let target = repo.join("org/module/1.0/module.jar");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, b"theirs").unwrap();

        let err = resolver.publish(&artifact, &source, false).unwrap_err();

        assert!(matches!(err, ResolverError::AlreadyExists(ref p) if p == &target));
        assert_eq!(fs::read(&target).unwrap(), b"theirs");
    }

    #[test]
    fn metadata_artifact_uses_descriptor_pattern() {
        let temp_dir = TempDir::new().unwrap();
        write_descriptor(temp_dir.path(), "1.0", "integration");
        let resolver = resolver(temp_dir.path());
        let artifact = Artifact::new(
            mrid("1.0"),
            "module",
            DESCRIPTOR_ARTIFACT_TYPE,
            DESCRIPTOR_ARTIFACT_EXT,
            Utc::now(),
        );

        assert!(resolver.exists(&artifact).unwrap());
    }

    #[test]
    fn listings_are_sorted_and_unique() {
        let temp_dir = TempDir::new().unwrap();
        for revision in ["1.10", "1.2", "1.9"] {
            write_descriptor(temp_dir.path(), revision, "integration");
        }
        fs::create_dir_all(temp_dir.path().join("acme/tool/0.1")).unwrap();
        let resolver = resolver(temp_dir.path());

        let organisations: Vec<_> = resolver
            .list_organisations()
            .unwrap()
            .into_iter()
            .map(|e| e.organisation)
            .collect();
        assert_eq!(organisations, vec!["acme", "org"]);

        let revisions: Vec<_> = resolver
            .list_revisions(&ModuleId::new("org", "module"))
            .unwrap()
            .into_iter()
            .map(|e| e.module_revision_id.revision)
            .collect();
        assert_eq!(revisions, vec!["1.2", "1.9", "1.10"]);
    }

    #[rstest]
    #[case("latest.integration", Some("2.0"))]
    #[case("latest.release", Some("1.5"))]
    #[case("latest.milestone", Some("1.5"))]
    #[case("1.+", Some("1.5"))]
    #[case("[1.0,1.5)", Some("1.0"))]
    #[case("3.+", None)]
    fn locate_picks_newest_acceptable(#[case] constraint: &str, #[case] expected: Option<&str>) {
        let temp_dir = TempDir::new().unwrap();
        write_descriptor(temp_dir.path(), "1.0", "release");
        write_descriptor(temp_dir.path(), "1.5", "release");
        write_descriptor(temp_dir.path(), "2.0", "integration");
        let resolver = resolver(temp_dir.path());

        let resource = resolver
            .locate(&DependencyDescriptor::new(mrid(constraint)))
            .unwrap();

        assert_eq!(resource.map(|r| r.revision), expected.map(str::to_string));
    }

    #[test]
    fn locate_exact_requires_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        write_descriptor(temp_dir.path(), "1.0", "release");
        let resolver = resolver(temp_dir.path());

        assert!(resolver.locate(&DependencyDescriptor::new(mrid("1.0"))).unwrap().is_some());
        assert!(resolver.locate(&DependencyDescriptor::new(mrid("1.1"))).unwrap().is_none());
    }

    #[test]
    fn fetch_reads_located_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        write_descriptor(temp_dir.path(), "1.0", "release");
        let resolver = resolver(temp_dir.path());
        let resource = resolver
            .locate(&DependencyDescriptor::new(mrid("1.+")))
            .unwrap()
            .unwrap();

        let bytes = resolver.fetch_descriptor(&resource, &mrid("1.0")).unwrap();
        let descriptor: ModuleDescriptor = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(descriptor.id, mrid("1.0"));
    }
}
