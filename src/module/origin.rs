//! Artifact provenance records

use serde::{Deserialize, Serialize};

/// Where an artifact physically came from
///
/// `Unknown` means no record exists. It is a distinct value: a known origin
/// with an empty location is not unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactOrigin {
    Unknown,
    Known { is_local: bool, location: String },
}

impl ArtifactOrigin {
    pub fn local(location: impl Into<String>) -> Self {
        ArtifactOrigin::Known {
            is_local: true,
            location: location.into(),
        }
    }

    pub fn remote(location: impl Into<String>) -> Self {
        ArtifactOrigin::Known {
            is_local: false,
            location: location.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ArtifactOrigin::Unknown)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            ArtifactOrigin::Unknown => None,
            ArtifactOrigin::Known { location, .. } => Some(location),
        }
    }

    pub fn is_local(&self) -> Option<bool> {
        match self {
            ArtifactOrigin::Unknown => None,
            ArtifactOrigin::Known { is_local, .. } => Some(*is_local),
        }
    }
}
