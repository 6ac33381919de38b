//! Registry of launched service processes
//!
//! The only shared mutable state in the core. Uses a std mutex so teardown
//! can run from synchronous contexts (panic hook, `Drop`); a poisoned lock
//! is recovered rather than propagated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::errors::RegistryError;
use crate::domain::models::ProcessHandle;

/// Service name to process handle, at most one live handle per name
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<ProcessHandle>>>>,
    closed: Arc<AtomicBool>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<ProcessHandle>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track a freshly launched process
    ///
    /// A dead handle under the same name is replaced; a live one is an error.
    /// After [`close`](Self::close) nothing more is accepted. A rejected
    /// handle is terminated before returning so it cannot leak.
    pub fn insert(&self, handle: ProcessHandle) -> Result<Arc<ProcessHandle>, RegistryError> {
        let mut entries = self.lock();
        if self.is_closed() {
            handle.terminate();
            return Err(RegistryError::Closed(handle.service().to_string()));
        }
        if let Some(existing) = entries.get(handle.service()) {
            if existing.is_alive() && !existing.termination_requested() {
                handle.terminate();
                return Err(RegistryError::AlreadyTracked(handle.service().to_string()));
            }
        }
        let handle = Arc::new(handle);
        entries.insert(handle.service().to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Stop accepting new handles
    pub fn close(&self) {
        let _entries = self.lock();
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn get(&self, service: &str) -> Option<Arc<ProcessHandle>> {
        self.lock().get(service).cloned()
    }

    /// Whether a live, not-yet-terminated handle exists for `service`
    pub fn has_live(&self, service: &str) -> bool {
        self.lock()
            .get(service)
            .is_some_and(|handle| handle.is_alive() && !handle.termination_requested())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Tracked service names, sorted
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove and return every entry
    ///
    /// Concurrent callers each get a disjoint set, so every entry is handed
    /// out exactly once.
    pub fn drain(&self) -> Vec<Arc<ProcessHandle>> {
        let mut handles: Vec<Arc<ProcessHandle>> =
            self.lock().drain().map(|(_, handle)| handle).collect();
        handles.sort_by(|a, b| a.service().cmp(b.service()));
        handles
    }
}
