//! Matcher chain: the first matcher recognising a constraint decides

use std::sync::Arc;

use crate::module::ModuleDescriptor;
use crate::version::matcher::VersionMatcher;
use crate::version::matchers::{
    LatestVersionMatcher, PatternVersionMatcher, SubRevisionMatcher, VersionRangeMatcher,
};

pub struct ChainVersionMatcher {
    matchers: Vec<Arc<dyn VersionMatcher>>,
}

impl ChainVersionMatcher {
    pub fn new(matchers: Vec<Arc<dyn VersionMatcher>>) -> Self {
        Self { matchers }
    }

    fn find(&self, revision: &str) -> Option<&Arc<dyn VersionMatcher>> {
        self.matchers.iter().find(|m| m.is_dynamic(revision))
    }
}

impl Default for ChainVersionMatcher {
    /// latest, sub revision, range and pattern matchers; everything else is exact
    fn default() -> Self {
        Self::new(vec![
            Arc::new(LatestVersionMatcher),
            Arc::new(SubRevisionMatcher),
            Arc::new(VersionRangeMatcher),
            Arc::new(PatternVersionMatcher),
        ])
    }
}

impl VersionMatcher for ChainVersionMatcher {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn is_dynamic(&self, revision: &str) -> bool {
        self.find(revision).is_some()
    }

    fn accept(&self, constraint: &str, candidate: &str) -> bool {
        match self.find(constraint) {
            Some(matcher) => matcher.accept(constraint, candidate),
            None => constraint == candidate,
        }
    }

    fn needs_descriptor(&self, constraint: &str) -> bool {
        self.find(constraint)
            .is_some_and(|m| m.needs_descriptor(constraint))
    }

    fn accept_descriptor(&self, constraint: &str, descriptor: &ModuleDescriptor) -> bool {
        match self.find(constraint) {
            Some(matcher) => matcher.accept_descriptor(constraint, descriptor),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("latest.integration", true)]
    #[case("1.+", true)]
    #[case("[1.0,2.0)", true)]
    #[case(r"regexp(1\..*)", true)]
    #[case("1.1", false)]
    #[case("trunk-SNAPSHOT", false)]
    fn default_chain_classifies_revisions(#[case] revision: &str, #[case] expected: bool) {
        assert_eq!(ChainVersionMatcher::default().is_dynamic(revision), expected);
    }

    #[rstest]
    #[case("1.+", "1.4", true)]
    #[case("[1.0,2.0)", "2.0", false)]
    #[case("1.1", "1.1", true)]
    #[case("1.1", "1.2", false)]
    fn accept_delegates_to_recognising_matcher(
        #[case] constraint: &str,
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(ChainVersionMatcher::default().accept(constraint, candidate), expected);
    }

    #[test]
    fn empty_chain_treats_everything_as_exact() {
        let chain = ChainVersionMatcher::new(vec![]);
        assert!(!chain.is_dynamic("latest.integration"));
        assert!(!chain.needs_descriptor("latest.release"));
    }
}
