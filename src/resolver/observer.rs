//! Resolution diagnostics
//!
//! Components report through the observer held by their session rather than
//! logging to a process-wide sink directly.

use std::sync::Mutex;

use tracing::{debug, error, info};

use crate::module::ModuleRevisionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionEvent {
    /// Exact revision found in the cache
    CacheHit { id: ModuleRevisionId },
    /// Dynamic request answered by a cached revision
    DynamicHit {
        requested: ModuleRevisionId,
        resolved: ModuleRevisionId,
    },
    /// Answered from the session memo without consulting any store
    MemoHit { id: ModuleRevisionId },
    NotFound { id: ModuleRevisionId },
    /// A resolver lists a revision whose descriptor is missing
    Inconsistent {
        requested: ModuleRevisionId,
        resolved: ModuleRevisionId,
        resolver: String,
    },
    /// Fetched from a live resolver and written back
    Resolved { id: ModuleRevisionId, resolver: String },
}

pub trait ResolutionObserver: Send + Sync {
    fn on_event(&self, event: &ResolutionEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ResolutionObserver for TracingObserver {
    fn on_event(&self, event: &ResolutionEvent) {
        match event {
            ResolutionEvent::CacheHit { id } => debug!("Found {} in cache", id),
            ResolutionEvent::DynamicHit { requested, resolved } => {
                debug!("Found {} in cache for {}", resolved, requested)
            }
            ResolutionEvent::MemoHit { id } => debug!("{} already resolved in this session", id),
            ResolutionEvent::NotFound { id } => debug!("{} not found in cache", id),
            ResolutionEvent::Inconsistent {
                requested,
                resolved,
                resolver,
            } => error!(
                "Inconsistent cache: {} lists {} for {} but no descriptor is cached; clean the cache and resolve again",
                resolver, resolved, requested
            ),
            ResolutionEvent::Resolved { id, resolver } => info!("Resolved {} with {}", id, resolver),
        }
    }
}

/// Collects events for later inspection
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ResolutionEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ResolutionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ResolutionObserver for RecordingObserver {
    fn on_event(&self, event: &ResolutionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
