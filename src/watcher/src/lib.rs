//! Watches a shard's terms and starts recovery of the local replica when its
//! term falls behind the leader's.

mod config;
pub use config::Config;

mod driver;
pub use driver::{Driver, Interrupted};
use driver::is_interrupt;

mod info;
pub use info::Info;

mod registry;
pub use registry::Registry;

mod replica;
pub use replica::ReplicaId;

mod snapshot;
pub use snapshot::TermSnapshot;

mod status;
pub use status::Status;
use status::AtomicStatus;

mod term;
pub use term::Term;

mod watcher;
pub use watcher::TermWatcher;

pub use anyhow::{Error, Result};
