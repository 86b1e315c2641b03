//! Sub revision matcher
//!
//! `1.+` matches every revision starting with `1.`; a bare `+` matches anything.

use crate::version::matcher::VersionMatcher;

pub struct SubRevisionMatcher;

impl VersionMatcher for SubRevisionMatcher {
    fn name(&self) -> &'static str {
        "sub-revision"
    }

    fn is_dynamic(&self, revision: &str) -> bool {
        revision.ends_with('+')
    }

    fn accept(&self, constraint: &str, candidate: &str) -> bool {
        match constraint.strip_suffix('+') {
            Some(prefix) => candidate.starts_with(prefix),
            None => constraint == candidate,
        }
    }
}
