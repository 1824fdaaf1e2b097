use crate::*;

/// Configure a term watcher
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// The local replica being watched.
    pub replica: ReplicaId,

    /// Whether election retries requested by the watcher are forced.
    pub force_election: bool,
}

impl Config {
    pub fn new(replica: impl Into<ReplicaId>) -> Config {
        Config {
            replica: replica.into(),
            force_election: false,
        }
    }
}
