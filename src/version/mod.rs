//! Revision constraint handling
//!
//! Decides whether a requested revision is exact or dynamic and, given
//! concrete candidates, which of them a constraint accepts.
//!
//! # Modules
//!
//! - [`matcher`]: `VersionMatcher` trait
//! - [`matchers`]: concrete matchers (exact, latest, sub revision, range, pattern, chain)
//! - [`revision`]: revision ordering shared by matchers and resolvers

pub mod matcher;
pub mod matchers;
pub mod revision;
