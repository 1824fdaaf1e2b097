use term_watcher::*;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering::SeqCst};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every collaborator call made by a watcher. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MockDriver {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Value returned by `is_shut_down`
    shut_down: AtomicBool,

    /// Collaborator calls, in order
    calls: Mutex<Vec<Call>>,

    /// Handles acquired and not yet dropped
    open_handles: Arc<AtomicUsize>,

    /// Injected failures
    failures: Mutex<Failures>,

    /// How long `do_recovery` blocks
    recovery_delay: Mutex<Option<Duration>>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Failures {
    pub(crate) election: Option<Failure>,
    pub(crate) acquire: Option<Failure>,
    pub(crate) recovery: Option<Failure>,
}

/// How an injected failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// A plain error
    Error,

    /// A cooperative interrupt
    Interrupt,

    /// The collaborator panics instead of returning
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RetryElection { replica: String, force: bool },
    Acquire(String),
    Recovery(String),
    Interrupt,
}

#[derive(Debug)]
pub struct MockHandle {
    replica: ReplicaId,
    open_handles: Arc<AtomicUsize>,
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, SeqCst);
    }
}

impl Failure {
    fn into_error(self, what: &str) -> Error {
        match self {
            Failure::Error => anyhow::anyhow!("{} failed", what),
            Failure::Interrupt => Error::new(Interrupted),
            Failure::Panic => panic!("{} panicked", what),
        }
    }
}

impl Driver for MockDriver {
    type Handle = MockHandle;

    fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(SeqCst)
    }

    fn retry_election(&self, replica: &ReplicaId, force: bool) -> Result<()> {
        self.record(Call::RetryElection {
            replica: replica.to_string(),
            force,
        });

        match self.failures().election {
            Some(failure) => Err(failure.into_error("election")),
            None => Ok(()),
        }
    }

    fn acquire(&self, replica: &ReplicaId) -> Result<MockHandle> {
        self.record(Call::Acquire(replica.to_string()));

        if let Some(failure) = self.failures().acquire {
            return Err(failure.into_error("acquire"));
        }

        self.inner.open_handles.fetch_add(1, SeqCst);

        Ok(MockHandle {
            replica: replica.clone(),
            open_handles: self.inner.open_handles.clone(),
        })
    }

    fn do_recovery(&self, handle: &mut MockHandle, replica: &ReplicaId) -> Result<()> {
        assert_eq!(handle.replica, *replica, "recovery on wrong handle");
        self.record(Call::Recovery(replica.to_string()));

        let delay = *self.inner.recovery_delay.lock().unwrap();

        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        match self.failures().recovery {
            Some(failure) => Err(failure.into_error("recovery")),
            None => Ok(()),
        }
    }

    fn signal_interrupt(&self) {
        self.record(Call::Interrupt);
    }
}

impl MockDriver {
    pub fn new() -> MockDriver {
        MockDriver::default()
    }

    pub fn set_shut_down(&self, shut_down: bool) {
        self.inner.shut_down.store(shut_down, SeqCst);
    }

    pub fn fail_election(&self, failure: Option<Failure>) {
        self.inner.failures.lock().unwrap().election = failure;
    }

    pub fn fail_acquire(&self, failure: Option<Failure>) {
        self.inner.failures.lock().unwrap().acquire = failure;
    }

    pub fn fail_recovery(&self, failure: Option<Failure>) {
        self.inner.failures.lock().unwrap().recovery = failure;
    }

    pub fn set_recovery_delay(&self, delay: Option<Duration>) {
        *self.inner.recovery_delay.lock().unwrap() = delay;
    }

    /// Take all calls recorded so far
    pub fn drain_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.inner.calls.lock().unwrap())
    }

    /// Number of recoveries recorded so far, without draining
    pub fn num_recoveries(&self) -> usize {
        self.inner
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, Call::Recovery(..)))
            .count()
    }

    pub fn open_handles(&self) -> usize {
        self.inner.open_handles.load(SeqCst)
    }

    fn failures(&self) -> Failures {
        self.inner.failures.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.inner.calls.lock().unwrap().push(call);
    }
}
