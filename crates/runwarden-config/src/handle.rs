use std::sync::{Arc, PoisonError, RwLock};

use crate::snapshot::ConfigSnapshot;

/// Shared pointer to the current snapshot.
///
/// Readers take an `Arc` clone and keep using it even if a reload swaps in a
/// newer snapshot; nothing is ever mutated in place.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<ConfigSnapshot>>>,
}

impl ConfigHandle {
    pub fn new(snapshot: Arc<ConfigSnapshot>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publish `next`, returning the snapshot it replaced.
    pub fn swap(&self, next: Arc<ConfigSnapshot>) -> Arc<ConfigSnapshot> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
