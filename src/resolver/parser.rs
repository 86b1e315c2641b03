use chrono::{DateTime, Utc};

use crate::error::ResolverError;
use crate::module::{ModuleDescriptor, ModuleRevisionId, ResolvedModuleRevision};
use crate::resolver::traits::DescriptorParser;

/// Parses descriptors stored as JSON [`ModuleDescriptor`] documents
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDescriptorParser;

impl DescriptorParser for JsonDescriptorParser {
    fn parse(
        &self,
        bytes: &[u8],
        id: &ModuleRevisionId,
        resolver_name: &str,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolvedModuleRevision, ResolverError> {
        let descriptor: ModuleDescriptor =
            serde_json::from_slice(bytes).map_err(|e| ResolverError::Malformed {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        if &descriptor.id != id {
            return Err(ResolverError::Malformed {
                id: id.to_string(),
                reason: format!("descriptor declares {}", descriptor.id),
            });
        }

        Ok(ResolvedModuleRevision::new(descriptor, resolver_name, resolved_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleId;

    fn mrid(revision: &str) -> ModuleRevisionId {
        ModuleRevisionId::new(ModuleId::new("org", "module"), revision)
    }

    #[test]
    fn parses_descriptor_with_defaults() {
        let bytes = serde_json::to_vec(&serde_json::json!({
            "id": { "module_id": { "organisation": "org", "name": "module" }, "revision": "1.1" },
            "publication": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let resolved = JsonDescriptorParser
            .parse(&bytes, &mrid("1.1"), "remote", Utc::now())
            .unwrap();

        assert_eq!(resolved.id(), &mrid("1.1"));
        assert_eq!(resolved.descriptor().status, "integration");
        assert_eq!(resolved.resolver_name(), "remote");
    }

    #[test]
    fn garbage_is_malformed() {
        let err = JsonDescriptorParser
            .parse(b"<module/>", &mrid("1.1"), "remote", Utc::now())
            .unwrap_err();
        assert!(matches!(err, ResolverError::Malformed { .. }));
    }

    #[test]
    fn wrong_identity_is_malformed() {
        let descriptor = ModuleDescriptor::new(mrid("2.0"), Utc::now());
        let bytes = serde_json::to_vec(&descriptor).unwrap();

        let err = JsonDescriptorParser
            .parse(&bytes, &mrid("1.1"), "remote", Utc::now())
            .unwrap_err();
        assert!(matches!(err, ResolverError::Malformed { ref reason, .. } if reason.contains("2.0")));
    }
}
