//! Resolution against the cache
//! - finder.rs: exact and dynamic lookup of what the cache already knows
//! - refresh.rs: live resolution with write-back
//! - pattern_resolver.rs: resolver over a pattern-laid-out directory tree
//! - local_store.rs: the cache root used as a resolver
//! - session.rs / observer.rs: per-run memo and diagnostics

pub mod finder;
pub mod local_store;
pub mod observer;
pub mod parser;
pub mod pattern_resolver;
pub mod refresh;
pub mod session;
pub mod traits;
pub mod types;

pub use finder::{FoundRevision, RevisionFinder};
pub use local_store::{CacheRootSource, LOCAL_STORE_NAME, LocalStorePatterns, LocalStoreResolver};
pub use observer::{RecordingObserver, ResolutionEvent, ResolutionObserver, TracingObserver};
pub use parser::JsonDescriptorParser;
pub use pattern_resolver::{FixedPatterns, PatternProvider, PatternResolver, PatternSet};
pub use refresh::{LiveResolver, resolve_and_cache};
pub use session::{ResolutionSession, SessionMemo};
pub use traits::{DescriptorFetcher, DescriptorParser, ModuleLocator};
pub use types::{ModuleEntry, OrganisationEntry, ResolvedResource, RevisionEntry};
