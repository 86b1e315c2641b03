//! Constraint-specific version matchers

pub mod chain;
pub mod exact;
pub mod latest;
pub mod pattern;
pub mod range;
pub mod sub_revision;

pub use chain::ChainVersionMatcher;
pub use exact::ExactVersionMatcher;
pub use latest::LatestVersionMatcher;
pub use pattern::PatternVersionMatcher;
pub use range::VersionRangeMatcher;
pub use sub_revision::SubRevisionMatcher;
