//! Module resolution cache and consistency layer
//!
//! Maps exact and dynamic dependency requests to module revisions that were
//! resolved before, persists descriptors, resolved-revision mappings and
//! artifact provenance, and keeps concurrent writers from corrupting the
//! shared cache root.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │   Resolver   │────▶│ RevisionFinder   │────▶│   Version   │
//! │ (live/local) │     │ (find_in_cache)  │     │   Matcher   │
//! └──────────────┘     └──────────────────┘     └─────────────┘
//!        │                      │
//!        ▼                      ▼
//! ┌──────────────┐     ┌──────────────────┐
//! │   Patterns   │     │ RepositoryCache  │
//! │ (file layout)│     │ descriptors/map/ │
//! └──────────────┘     │ origins/TTL      │
//!                      └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`module`]: identities, descriptors, artifacts and provenance records
//! - [`version`]: dynamic revision classification and matching
//! - [`cache`]: persisted stores, freshness policy and artifact reconciliation
//! - [`resolver`]: resolution algorithm, session memo and the local-store resolver
//! - [`config`]: configuration and default directories
//! - [`error`]: error types for cache and resolver operations

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod resolver;
pub mod version;
