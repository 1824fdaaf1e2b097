use crate::*;

use anyhow::Context as _;
use std::fmt;
use std::any::Any;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

/// Starts recovery of the local replica whenever its term falls behind the
/// shard's highest term.
///
/// The term service calls [`on_term_changed`] on every change to the
/// shard's terms, possibly from several threads at once. A given term value
/// triggers recovery at most once per watcher, even if other replicas' terms
/// keep changing around it.
///
/// Two watchers are equal, and hash the same, when they watch the same
/// replica. Their state is not compared.
///
/// [`on_term_changed`]: TermWatcher::on_term_changed
pub struct TermWatcher<T: Driver> {
    config: Config,

    /// Handle to the collaborators: shutdown query, leader elector, replica
    /// handles and recovery.
    driver: T,

    status: AtomicStatus,

    /// Highest term recovery was started for. Never decreases.
    last_triggered: Mutex<Option<Term>>,

    pub(crate) stats: Stats,
}

#[derive(Default)]
pub(crate) struct Stats {
    pub(crate) started: AtomicU64,
    pub(crate) failed: AtomicU64,
}

impl<T: Driver> TermWatcher<T> {
    pub fn new(driver: T, config: Config) -> TermWatcher<T> {
        TermWatcher {
            config,
            driver,
            status: AtomicStatus::new(),
            last_triggered: Mutex::new(None),
            stats: Stats::default(),
        }
    }

    /// Returns the replica this watcher acts for
    pub fn replica(&self) -> &ReplicaId {
        &self.config.replica
    }

    /// Returns the watcher's current status
    pub fn status(&self) -> Status {
        self.status.load()
    }

    /// Returns `true` once the owner has called `close()`
    pub fn is_closed(&self) -> bool {
        self.status().is_closed()
    }

    /// Highest term recovery has been started for
    pub fn last_triggered(&self) -> Option<Term> {
        *self.lock_last_triggered()
    }

    /// Returns a reference to the driver
    pub fn driver(&self) -> &T {
        &self.driver
    }

    /// Return info about the watcher
    pub fn info(&self) -> Info {
        Info::from_watcher(self)
    }

    /// React to a change of the shard's terms.
    ///
    /// Returns `false` when the term service should drop this watcher: the
    /// process is shutting down, the watcher was closed, or a recovery
    /// attempt failed. Collaborator errors never escape this call.
    pub fn on_term_changed(&self, snapshot: &TermSnapshot) -> bool {
        if self.driver.is_shut_down() {
            tracing::trace!(replica = %self.config.replica, "shutting down; ignoring term change");
            return false;
        }

        let span = tracing::info_span!("term_watcher", replica = %self.config.replica);
        let _enter = span.enter();

        if self.is_closed() {
            tracing::trace!("watcher closed; ignoring term change");
            return false;
        }

        let replica = &self.config.replica;

        if snapshot.has_highest_term(replica) {
            return true;
        }

        let term = match snapshot.term(replica) {
            Some(term) => term,
            None => return true,
        };

        if !self.claim(term) {
            // Another replica's term changed, or a concurrent delivery
            // already started recovery for this term.
            return true;
        }

        tracing::info!(
            %term,
            max_term = ?snapshot.max_term(),
            version = snapshot.version(),
            "starting recovery; replica's term is less than the leader's term"
        );

        self.stats.started.fetch_add(1, Relaxed);

        // A panicking collaborator counts as a failed attempt and must not
        // unwind into the notification thread.
        let res = panic::catch_unwind(AssertUnwindSafe(|| self.trigger_recovery()))
            .unwrap_or_else(|payload| Err(panic_to_error(payload)));

        match res {
            Ok(()) => true,
            Err(err) => {
                self.stats.failed.fetch_add(1, Relaxed);

                tracing::info!(%term, "failed to watch term of replica; error={:?}", err);

                if is_interrupt(&err) {
                    self.driver.signal_interrupt();
                }

                // A concurrent `close()` wins; the watcher stays closed.
                let _ = self
                    .status
                    .transition(Status::Active, Status::UnregisteredByFailure);

                false
            }
        }
    }

    /// Stop reacting to term changes. Every later `on_term_changed` call
    /// returns `false` without side effects.
    pub fn close(&self) {
        if !self.status.close().is_closed() {
            tracing::debug!(replica = %self.config.replica, "term watcher closed");
        }
    }

    /// Return a watcher that unregistered itself after a failure to the
    /// `Active` status. Returns `false` if the watcher was not in that
    /// status.
    pub fn reactivate(&self) -> bool {
        self.status
            .transition(Status::UnregisteredByFailure, Status::Active)
            .is_ok()
    }

    /// Record `term` as the last triggered term if it is greater than the
    /// current one. Exactly one concurrent caller wins a given increase.
    fn claim(&self, term: Term) -> bool {
        let mut last_triggered = self.lock_last_triggered();

        match *last_triggered {
            Some(prev) if prev >= term => false,
            _ => {
                *last_triggered = Some(term);
                true
            }
        }
    }

    fn trigger_recovery(&self) -> Result<()> {
        let replica = &self.config.replica;

        self.driver
            .retry_election(replica, self.config.force_election)
            .context("failed to retry leader election")?;

        let started_at = Instant::now();

        // The handle is released when it goes out of scope, on every path.
        let mut handle = self
            .driver
            .acquire(replica)
            .context("failed to acquire replica handle")?;

        self.driver
            .do_recovery(&mut handle, replica)
            .context("recovery failed")?;

        tracing::debug!(elapsed = ?started_at.elapsed(), "recovery complete");

        Ok(())
    }

    fn lock_last_triggered(&self) -> std::sync::MutexGuard<'_, Option<Term>> {
        // The critical section cannot panic half way, so a poisoned value
        // is still consistent.
        self.last_triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_to_error(payload: Box<dyn Any + Send>) -> Error {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");

    anyhow::anyhow!("recovery panicked: {}", message)
}

impl<T: Driver> PartialEq for TermWatcher<T> {
    fn eq(&self, other: &Self) -> bool {
        self.config.replica == other.config.replica
    }
}

impl<T: Driver> Eq for TermWatcher<T> {}

impl<T: Driver> Hash for TermWatcher<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.config.replica.hash(state);
    }
}

impl<T: Driver> fmt::Debug for TermWatcher<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("TermWatcher")
            .field("replica", &self.config.replica)
            .field("status", &self.status())
            .field("last_triggered", &self.last_triggered())
            .finish()
    }
}
