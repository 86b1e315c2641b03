//! Exact revision matcher

use crate::version::matcher::VersionMatcher;

/// Treats every revision as concrete; a candidate matches only itself
pub struct ExactVersionMatcher;

impl VersionMatcher for ExactVersionMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn is_dynamic(&self, _revision: &str) -> bool {
        false
    }

    fn accept(&self, constraint: &str, candidate: &str) -> bool {
        constraint == candidate
    }
}
