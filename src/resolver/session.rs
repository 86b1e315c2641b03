//! State private to one top-level resolution run

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::module::{ModuleRevisionId, ResolvedModuleRevision};
use crate::resolver::observer::{ResolutionEvent, ResolutionObserver, TracingObserver};

/// Revisions already resolved during the current run
///
/// Never persisted. Entries are keyed by the id they were requested or
/// resolved as, so a dynamic constraint and its concrete revision both hit.
#[derive(Debug, Default)]
pub struct SessionMemo {
    entries: Mutex<HashMap<ModuleRevisionId, Arc<ResolvedModuleRevision>>>,
}

impl SessionMemo {
    pub fn get(&self, id: &ModuleRevisionId) -> Option<Arc<ResolvedModuleRevision>> {
        self.entries.lock().ok()?.get(id).cloned()
    }

    pub fn record(&self, id: ModuleRevisionId, resolved: Arc<ResolvedModuleRevision>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id, resolved);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One resolution run: its memo and its observer
///
/// Not `Clone`: start a new session for every run.
pub struct ResolutionSession {
    memo: SessionMemo,
    observer: Arc<dyn ResolutionObserver>,
}

impl Default for ResolutionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    pub fn with_observer(observer: Arc<dyn ResolutionObserver>) -> Self {
        Self {
            memo: SessionMemo::default(),
            observer,
        }
    }

    pub fn memo(&self) -> &SessionMemo {
        &self.memo
    }

    pub fn emit(&self, event: ResolutionEvent) {
        self.observer.on_event(&event);
    }
}
