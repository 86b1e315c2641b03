//! Regular expression matcher: `regexp(1\.[0-9]+)`

use regex::Regex;
use tracing::warn;

use crate::version::matcher::VersionMatcher;

pub struct PatternVersionMatcher;

fn pattern_body(revision: &str) -> Option<&str> {
    revision.strip_prefix("regexp(")?.strip_suffix(')')
}

impl VersionMatcher for PatternVersionMatcher {
    fn name(&self) -> &'static str {
        "regexp"
    }

    fn is_dynamic(&self, revision: &str) -> bool {
        pattern_body(revision).is_some()
    }

    fn accept(&self, constraint: &str, candidate: &str) -> bool {
        let Some(body) = pattern_body(constraint) else {
            return constraint == candidate;
        };
        match Regex::new(&format!("^(?:{})$", body)) {
            Ok(re) => re.is_match(candidate),
            Err(e) => {
                warn!("Invalid revision pattern {}: {}", constraint, e);
                false
            }
        }
    }
}
