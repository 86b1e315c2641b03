//! Version matching abstraction for revision constraints

use crate::module::ModuleDescriptor;

/// Trait for constraint-specific version matching logic
///
/// Each constraint family has its own rules:
/// - latest: `latest.integration` accepts the newest revision with at least that status
/// - sub revision: `1.+` accepts 1.0, 1.5.2, but not 2.0
/// - range: `[1.0,2.0)` accepts 1.0 up to but excluding 2.0
pub trait VersionMatcher: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Whether the revision token is a constraint rather than a concrete revision
    fn is_dynamic(&self, revision: &str) -> bool;

    /// Check if a concrete candidate revision satisfies the constraint
    fn accept(&self, constraint: &str, candidate: &str) -> bool;

    /// Whether `accept_descriptor` must be consulted for this constraint
    fn needs_descriptor(&self, _constraint: &str) -> bool {
        false
    }

    /// Check a candidate against metadata only available from its descriptor
    fn accept_descriptor(&self, _constraint: &str, _descriptor: &ModuleDescriptor) -> bool {
        true
    }
}
