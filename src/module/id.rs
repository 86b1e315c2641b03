//! Module and module revision identities

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of a module family: (organisation, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    pub organisation: String,
    pub name: String,
}

impl ModuleId {
    pub fn new(organisation: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organisation: organisation.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.organisation, self.name)
    }
}

/// Identity of one module revision
///
/// The revision token may be exact ("1.1") or dynamic ("latest.integration",
/// "[1.0,2.0)"); which one is decided by a
/// [`VersionMatcher`](crate::version::matcher::VersionMatcher).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRevisionId {
    pub module_id: ModuleId,
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_attributes: BTreeMap<String, String>,
}

impl ModuleRevisionId {
    pub fn new(module_id: ModuleId, revision: impl Into<String>) -> Self {
        Self {
            module_id,
            revision: revision.into(),
            branch: None,
            extra_attributes: BTreeMap::new(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_extra_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_attributes.insert(key.into(), value.into());
        self
    }

    /// Same identity with the revision token replaced
    ///
    /// Used to turn a dynamic request into the concrete revision a resolver found.
    pub fn with_revision(&self, revision: impl Into<String>) -> Self {
        Self {
            module_id: self.module_id.clone(),
            revision: revision.into(),
            branch: self.branch.clone(),
            extra_attributes: self.extra_attributes.clone(),
        }
    }

    pub fn organisation(&self) -> &str {
        &self.module_id.organisation
    }

    pub fn name(&self) -> &str {
        &self.module_id.name
    }

    /// Short digest of branch and extra attributes
    ///
    /// Returns None for plain ids so their on-disk names stay readable.
    pub fn qualifier(&self) -> Option<String> {
        if self.branch.is_none() && self.extra_attributes.is_empty() {
            return None;
        }
        Some(digest_parts(self.qualifier_parts().iter().map(String::as_str)))
    }

    /// Canonical parts of the full identity, in a fixed order
    pub(crate) fn identity_parts(&self) -> Vec<String> {
        let mut parts = vec![
            self.module_id.organisation.clone(),
            self.module_id.name.clone(),
            self.revision.clone(),
        ];
        parts.extend(self.qualifier_parts());
        parts
    }

    fn qualifier_parts(&self) -> Vec<String> {
        let mut parts = match &self.branch {
            Some(branch) => vec!["branch".to_string(), branch.clone()],
            None => vec!["nobranch".to_string()],
        };
        for (key, value) in &self.extra_attributes {
            parts.push(key.clone());
            parts.push(value.clone());
        }
        parts
    }
}

impl fmt::Display for ModuleRevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.module_id.organisation, self.module_id.name)?;
        if let Some(branch) = &self.branch {
            write!(f, "#{}", branch)?;
        }
        write!(f, ";{}", self.revision)?;
        if !self.extra_attributes.is_empty() {
            let extras: Vec<_> = self
                .extra_attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "[{}]", extras.join(","))?;
        }
        Ok(())
    }
}

/// Length-prefixed SHA-256 over the given parts, first 16 hex chars
///
/// Length prefixes keep ("ab", "c") and ("a", "bc") apart.
pub(crate) fn digest_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mrid(revision: &str) -> ModuleRevisionId {
        ModuleRevisionId::new(ModuleId::new("org", "module"), revision)
    }

    #[test]
    fn with_revision_keeps_branch_and_extra_attributes() {
        let dynamic = mrid("latest.integration")
            .with_branch("trunk")
            .with_extra_attribute("platform", "linux");

        let concrete = dynamic.with_revision("1.1");

        assert_eq!(concrete.revision, "1.1");
        assert_eq!(concrete.branch.as_deref(), Some("trunk"));
        assert_eq!(
            concrete.extra_attributes.get("platform").map(String::as_str),
            Some("linux")
        );
    }

    #[test]
    fn qualifier_is_none_for_plain_ids() {
        assert_eq!(mrid("1.1").qualifier(), None);
    }

    #[test]
    fn qualifier_distinguishes_branch_from_extra_attribute() {
        let with_branch = mrid("1.1").with_branch("x");
        let with_extra = mrid("1.1").with_extra_attribute("branch", "x");
        let with_empty_branch = mrid("1.1").with_branch("");

        assert_ne!(with_branch.qualifier(), with_extra.qualifier());
        assert_ne!(with_empty_branch.qualifier(), None);
        assert_ne!(with_empty_branch.qualifier(), with_branch.qualifier());
    }

    #[test]
    fn digest_parts_is_length_prefixed() {
        assert_ne!(digest_parts(["ab", "c"]), digest_parts(["a", "bc"]));
        assert_eq!(digest_parts(["a", "bc"]).len(), 16);
    }

    #[rstest]
    #[case(mrid("1.1"), "org#module;1.1")]
    #[case(mrid("1.1").with_branch("trunk"), "org#module#trunk;1.1")]
    #[case(
        mrid("2.0").with_extra_attribute("os", "linux"),
        "org#module;2.0[os=linux]"
    )]
    fn display_formats_identity(#[case] id: ModuleRevisionId, #[case] expected: &str) {
        assert_eq!(id.to_string(), expected);
    }
}
