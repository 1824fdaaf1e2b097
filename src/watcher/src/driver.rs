use crate::*;

use std::fmt;

/// Collaborators a [`TermWatcher`] calls out to.
///
/// Notifications may be delivered from several threads at once, so every
/// method takes `&self`.
pub trait Driver: Send + Sync + 'static {
    /// Live reference to the local replica's runtime state. Dropping the
    /// handle releases it.
    type Handle: Send;

    /// Returns `true` once the enclosing process has started shutting down.
    fn is_shut_down(&self) -> bool;

    /// Ask the shard's leader elector to retry the election.
    ///
    /// This must not block. When no elector exists for the replica, this is
    /// a no-op returning `Ok(())`.
    fn retry_election(&self, replica: &ReplicaId, force: bool) -> Result<()>;

    /// Acquire a handle to the replica's runtime. Fails if the replica is
    /// already shutting down.
    fn acquire(&self, replica: &ReplicaId) -> Result<Self::Handle>;

    /// Resynchronize the replica's data. Blocks until recovery completes or
    /// fails.
    fn do_recovery(&self, handle: &mut Self::Handle, replica: &ReplicaId) -> Result<()>;

    /// Re-raise a cooperative interrupt that was swallowed by the watcher.
    fn signal_interrupt(&self);
}

/// Returned by collaborators when the current work should be abandoned
/// cooperatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Returns `true` if `Interrupted` appears anywhere in the error's chain.
pub(crate) fn is_interrupt(err: &Error) -> bool {
    err.chain().any(|cause| cause.is::<Interrupted>())
}

#[test]
fn test_interrupt_in_chain() {
    let err = Error::new(Interrupted).context("recovering replica");
    assert!(is_interrupt(&err));

    let err = anyhow::anyhow!("replica is closed");
    assert!(!is_interrupt(&err));
}
