use crate::*;

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Set of term watchers registered for one shard.
///
/// Watchers are keyed by replica, so registering a second watcher for the
/// same replica is rejected. Each published snapshot is delivered to every
/// watcher, and the ones that return `false` are dropped.
pub struct Registry<T: Driver> {
    watchers: Mutex<IndexMap<ReplicaId, Arc<TermWatcher<T>>>>,
}

impl<T: Driver> Registry<T> {
    pub fn new() -> Registry<T> {
        Registry {
            watchers: Mutex::new(IndexMap::new()),
        }
    }

    /// Register a watcher. Returns `false` if an equal watcher is already
    /// registered or the watcher has been closed.
    ///
    /// A watcher that previously unregistered itself after a failure is
    /// made active again.
    pub fn register(&self, watcher: Arc<TermWatcher<T>>) -> bool {
        let mut watchers = self.lock();

        if watcher.is_closed() || watchers.contains_key(watcher.replica()) {
            return false;
        }

        watcher.reactivate();
        watchers.insert(watcher.replica().clone(), watcher);
        true
    }

    pub fn unregister(&self, replica: &ReplicaId) -> Option<Arc<TermWatcher<T>>> {
        self.lock().shift_remove(replica)
    }

    pub fn contains(&self, replica: &ReplicaId) -> bool {
        self.lock().contains_key(replica)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver a snapshot to every registered watcher.
    ///
    /// Watchers are called outside of the registration lock, as recovery
    /// may block for a long time. Returns the number of watchers dropped.
    pub fn publish(&self, snapshot: &TermSnapshot) -> usize {
        let watchers: Vec<_> = self.lock().values().cloned().collect();

        let rejected: Vec<_> = watchers
            .into_iter()
            .filter(|watcher| !watcher.on_term_changed(snapshot))
            .collect();

        let mut watchers = self.lock();
        let mut removed = 0;

        for watcher in rejected {
            // Only drop the exact instance that rejected the snapshot. It may
            // have been replaced while the lock was released.
            let is_same = watchers
                .get(watcher.replica())
                .map_or(false, |current| Arc::ptr_eq(current, &watcher));

            if is_same {
                watchers.shift_remove(watcher.replica());
                removed += 1;

                tracing::debug!(replica = %watcher.replica(), status = ?watcher.status(), "term watcher unregistered");
            }
        }

        removed
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<ReplicaId, Arc<TermWatcher<T>>>> {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Driver> Default for Registry<T> {
    fn default() -> Registry<T> {
        Registry::new()
    }
}
