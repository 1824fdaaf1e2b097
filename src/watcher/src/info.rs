use crate::*;

use std::sync::atomic::Ordering::Relaxed;

/// Point-in-time view of a watcher's state.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Info {
    /// The watched replica
    pub replica: ReplicaId,

    pub status: Status,

    /// Highest term recovery was started for. `None` until the first
    /// recovery.
    pub last_triggered: Option<Term>,

    /// Number of recovery attempts started
    pub recoveries_started: u64,

    /// Number of recovery attempts that failed, unregistering the watcher
    pub recoveries_failed: u64,
}

impl Info {
    pub(crate) fn from_watcher<T: Driver>(watcher: &TermWatcher<T>) -> Info {
        Info {
            replica: watcher.replica().clone(),
            status: watcher.status(),
            last_triggered: watcher.last_triggered(),
            recoveries_started: watcher.stats.started.load(Relaxed),
            recoveries_failed: watcher.stats.failed.load(Relaxed),
        }
    }
}
