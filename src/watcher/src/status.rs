use std::sync::atomic::{AtomicU8, Ordering::*};

/// Lifecycle of a term watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Status {
    /// Receiving and acting on term changes.
    Active,

    /// The owning process called `close()`. Terminal.
    ClosedByOwner,

    /// A recovery attempt failed and the watcher asked the term service to
    /// drop it. The watcher resumes if it is registered again.
    UnregisteredByFailure,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Status::ClosedByOwner)
    }

    pub fn is_unregistered_by_failure(&self) -> bool {
        matches!(self, Status::UnregisteredByFailure)
    }

    fn to_u8(self) -> u8 {
        match self {
            Status::Active => 0,
            Status::ClosedByOwner => 1,
            Status::UnregisteredByFailure => 2,
        }
    }

    fn from_u8(src: u8) -> Status {
        match src {
            0 => Status::Active,
            1 => Status::ClosedByOwner,
            2 => Status::UnregisteredByFailure,
            _ => unreachable!("invalid status; {}", src),
        }
    }
}

/// `Status` cell shared between notification threads and the owner.
pub(crate) struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    pub(crate) fn new() -> AtomicStatus {
        AtomicStatus(AtomicU8::new(Status::Active.to_u8()))
    }

    pub(crate) fn load(&self) -> Status {
        Status::from_u8(self.0.load(Acquire))
    }

    /// Moves to `ClosedByOwner` from any state. Returns the previous status.
    pub(crate) fn close(&self) -> Status {
        Status::from_u8(self.0.swap(Status::ClosedByOwner.to_u8(), AcqRel))
    }

    /// Moves from `from` to `to`, failing if the current status is not
    /// `from`. A closed watcher is never moved.
    pub(crate) fn transition(&self, from: Status, to: Status) -> Result<(), Status> {
        debug_assert!(!from.is_closed());

        self.0
            .compare_exchange(from.to_u8(), to.to_u8(), AcqRel, Acquire)
            .map(|_| ())
            .map_err(Status::from_u8)
    }
}

#[test]
fn test_closed_is_absorbing() {
    let status = AtomicStatus::new();
    assert_eq!(status.load(), Status::Active);

    status
        .transition(Status::Active, Status::UnregisteredByFailure)
        .unwrap();
    assert_eq!(status.close(), Status::UnregisteredByFailure);
    assert_eq!(status.close(), Status::ClosedByOwner);

    assert_eq!(
        status.transition(Status::UnregisteredByFailure, Status::Active),
        Err(Status::ClosedByOwner)
    );
    assert!(status.load().is_closed());
}
