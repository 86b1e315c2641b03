pub mod atomic;
pub mod descriptor_store;
pub mod freshness;
pub mod layout;
pub mod mapping_store;
pub mod options;
pub mod origin_store;
pub mod pattern;
pub mod reconcile;
pub mod repository;

pub use freshness::{Clock, FreshnessPolicy, SystemClock, TtlRule};
pub use layout::CacheLayout;
pub use options::CacheMetadataOptions;
pub use reconcile::{ArtifactDownloadReport, ArtifactOutcome, DownloadReport, FailureReason};
pub use repository::{Lookup, RepositoryCache};
