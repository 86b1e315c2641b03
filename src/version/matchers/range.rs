//! Version range matcher
//!
//! Supports interval notation:
//! - `[1.0,2.0]` - inclusive on both ends
//! - `[1.0,2.0)` or `[1.0,2.0[` - upper bound excluded
//! - `]1.0,2.0]` or `(1.0,2.0]` - lower bound excluded
//! - `[1.0,)` - no upper bound
//! - `(,2.0]` - no lower bound

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::version::matcher::VersionMatcher;
use crate::version::revision::compare_revisions;

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\[\]\(])\s*([^,\[\]\(\)]*?)\s*,\s*([^,\[\]\(\)]*?)\s*([\[\]\)])$")
        .expect("static range pattern is valid")
});

#[derive(Debug, PartialEq, Eq)]
struct Bound<'a> {
    revision: &'a str,
    inclusive: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct Range<'a> {
    lower: Option<Bound<'a>>,
    upper: Option<Bound<'a>>,
}

impl<'a> Range<'a> {
    fn parse(spec: &'a str) -> Option<Self> {
        let caps = RANGE.captures(spec.trim())?;
        let bound = |index: usize, inclusive: bool| {
            caps.get(index)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(|revision| Bound {
                    revision,
                    inclusive,
                })
        };
        let lower_inclusive = caps.get(1).is_some_and(|m| m.as_str() == "[");
        let upper_inclusive = caps.get(4).is_some_and(|m| m.as_str() == "]");
        Some(Range {
            lower: bound(2, lower_inclusive),
            upper: bound(3, upper_inclusive),
        })
    }

    fn contains(&self, candidate: &str) -> bool {
        let above_lower = self.lower.as_ref().is_none_or(|b| {
            match compare_revisions(candidate, b.revision) {
                Ordering::Greater => true,
                Ordering::Equal => b.inclusive,
                Ordering::Less => false,
            }
        });
        let below_upper = self.upper.as_ref().is_none_or(|b| {
            match compare_revisions(candidate, b.revision) {
                Ordering::Less => true,
                Ordering::Equal => b.inclusive,
                Ordering::Greater => false,
            }
        });
        above_lower && below_upper
    }
}

pub struct VersionRangeMatcher;

impl VersionMatcher for VersionRangeMatcher {
    fn name(&self) -> &'static str {
        "version-range"
    }

    fn is_dynamic(&self, revision: &str) -> bool {
        Range::parse(revision).is_some()
    }

    fn accept(&self, constraint: &str, candidate: &str) -> bool {
        match Range::parse(constraint) {
            Some(range) => range.contains(candidate),
            None => constraint == candidate,
        }
    }
}
