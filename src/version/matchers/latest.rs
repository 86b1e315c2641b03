//! Latest revision matcher
//!
//! `latest.<status>` accepts any revision whose descriptor status is at least
//! as mature as `<status>` (integration < milestone < release). The newest
//! accepted revision is chosen by the caller.

use crate::module::ModuleDescriptor;
use crate::version::matcher::VersionMatcher;

const LATEST_PREFIX: &str = "latest.";

/// Known statuses, least mature first
pub const STATUSES: &[&str] = &["integration", "milestone", "release"];

pub struct LatestVersionMatcher;

fn status_rank(status: &str) -> Option<usize> {
    STATUSES.iter().position(|s| *s == status)
}

impl VersionMatcher for LatestVersionMatcher {
    fn name(&self) -> &'static str {
        "latest"
    }

    fn is_dynamic(&self, revision: &str) -> bool {
        revision.starts_with(LATEST_PREFIX)
    }

    fn accept(&self, constraint: &str, _candidate: &str) -> bool {
        self.is_dynamic(constraint)
    }

    fn needs_descriptor(&self, constraint: &str) -> bool {
        // Every status satisfies the least mature one
        constraint
            .strip_prefix(LATEST_PREFIX)
            .is_some_and(|status| status_rank(status) != Some(0))
    }

    fn accept_descriptor(&self, constraint: &str, descriptor: &ModuleDescriptor) -> bool {
        let Some(requested) = constraint.strip_prefix(LATEST_PREFIX) else {
            return false;
        };
        match (status_rank(requested), status_rank(&descriptor.status)) {
            (Some(wanted), Some(actual)) => actual >= wanted,
            // Unknown statuses only match themselves
            _ => requested == descriptor.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleId, ModuleRevisionId};
    use chrono::Utc;
    use rstest::rstest;

    fn descriptor(status: &str) -> ModuleDescriptor {
        let mut md = ModuleDescriptor::new(
            ModuleRevisionId::new(ModuleId::new("org", "module"), "1.0"),
            Utc::now(),
        );
        md.status = status.to_string();
        md
    }

    #[rstest]
    #[case("latest.integration", true)]
    #[case("latest.release", true)]
    #[case("1.0", false)]
    #[case("latest", false)]
    fn is_dynamic_returns_expected(#[case] revision: &str, #[case] expected: bool) {
        assert_eq!(LatestVersionMatcher.is_dynamic(revision), expected);
    }

    #[rstest]
    #[case("latest.integration", false)]
    #[case("latest.milestone", true)]
    #[case("latest.release", true)]
    fn needs_descriptor_except_for_integration(#[case] constraint: &str, #[case] expected: bool) {
        assert_eq!(LatestVersionMatcher.needs_descriptor(constraint), expected);
    }

    #[rstest]
    #[case("latest.integration", "integration", true)]
    #[case("latest.integration", "release", true)]
    #[case("latest.milestone", "integration", false)]
    #[case("latest.milestone", "release", true)]
    #[case("latest.release", "milestone", false)]
    #[case("latest.nightly", "nightly", true)]
    #[case("latest.nightly", "release", false)]
    fn accept_descriptor_compares_status(
        #[case] constraint: &str,
        #[case] status: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            LatestVersionMatcher.accept_descriptor(constraint, &descriptor(status)),
            expected
        );
    }
}
