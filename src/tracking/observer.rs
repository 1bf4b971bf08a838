use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::foundation::core::BatchId;

/// Listener notified at the four fixed points of every batch.
///
/// `will_layout`/`did_layout` run on the coordination actor, `will_mount`/`did_mount` on the
/// UI actor.
pub trait UiManagerObserver: Send + Sync {
    /// Before the layout pass of `batch`.
    fn will_layout(&self, _batch: BatchId) {}
    /// After the layout pass and diff of `batch`.
    fn did_layout(&self, _batch: BatchId) {}
    /// Before the first closure of `batch` is mounted.
    fn will_mount(&self, _batch: BatchId) {}
    /// After every closure of `batch` has run.
    fn did_mount(&self, _batch: BatchId) {}
}

/// Weak membership set of observers, shared by both actors.
#[derive(Clone, Default)]
pub struct ObserverCoordinator {
    observers: Arc<Mutex<Vec<Weak<dyn UiManagerObserver>>>>,
}

impl std::fmt::Debug for ObserverCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverCoordinator")
            .field("observers", &self.len())
            .finish()
    }
}

impl ObserverCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`. The coordinator does not keep it alive.
    pub fn add(&self, observer: &Arc<dyn UiManagerObserver>) {
        let mut list = self.lock();
        if !list.iter().any(|w| ptr_eq(w, observer)) {
            list.push(Arc::downgrade(observer));
        }
    }

    /// Unregister `observer`.
    pub fn remove(&self, observer: &Arc<dyn UiManagerObserver>) {
        self.lock().retain(|w| !ptr_eq(w, observer));
    }

    /// Live observers.
    pub fn len(&self) -> usize {
        self.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Whether no live observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn will_layout(&self, batch: BatchId) {
        self.each(|o| o.will_layout(batch));
    }

    pub(crate) fn did_layout(&self, batch: BatchId) {
        self.each(|o| o.did_layout(batch));
    }

    pub(crate) fn will_mount(&self, batch: BatchId) {
        self.each(|o| o.will_mount(batch));
    }

    pub(crate) fn did_mount(&self, batch: BatchId) {
        self.each(|o| o.did_mount(batch));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Weak<dyn UiManagerObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot live members (pruning dead ones) and notify them outside the lock.
    fn each(&self, f: impl Fn(&dyn UiManagerObserver)) {
        let live: Vec<Arc<dyn UiManagerObserver>> = {
            let mut list = self.lock();
            list.retain(|w| w.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for o in live {
            f(o.as_ref());
        }
    }
}

fn ptr_eq(weak: &Weak<dyn UiManagerObserver>, strong: &Arc<dyn UiManagerObserver>) -> bool {
    std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(strong))
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/observer.rs"]
mod tests;
