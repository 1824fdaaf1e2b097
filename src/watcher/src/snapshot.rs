use crate::*;

use indexmap::IndexMap;

/// Point-in-time view of every replica's term for one shard.
///
/// Snapshots are produced by the term service and only read by watchers.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TermSnapshot {
    /// Version of the shard terms this snapshot was taken at.
    version: u64,

    /// Term of each replica, in the order the replicas were added.
    terms: IndexMap<ReplicaId, Term>,
}

impl TermSnapshot {
    pub fn new() -> TermSnapshot {
        TermSnapshot::default()
    }

    pub fn with_version(version: u64) -> TermSnapshot {
        TermSnapshot {
            version,
            terms: IndexMap::new(),
        }
    }

    /// Set the term for a replica, replacing any previous value.
    pub fn insert(mut self, replica: impl Into<ReplicaId>, term: Term) -> TermSnapshot {
        self.terms.insert(replica.into(), term);
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the replica's term, if the snapshot has one.
    pub fn term(&self, replica: &ReplicaId) -> Option<Term> {
        self.terms.get(replica).copied()
    }

    /// Returns the highest term held by any replica.
    ///
    /// The method returns `None` when the snapshot is empty.
    pub fn max_term(&self) -> Option<Term> {
        self.terms.values().copied().max()
    }

    /// Returns `true` if `replica` holds the maximum term. Several replicas
    /// may hold it at once.
    ///
    /// A replica missing from the snapshot is considered to be at term 0, and
    /// every replica is considered current in an empty snapshot.
    pub fn has_highest_term(&self, replica: &ReplicaId) -> bool {
        match self.max_term() {
            Some(max) => self.term(replica).unwrap_or_default() == max,
            None => true,
        }
    }

    pub fn replicas(&self) -> impl Iterator<Item = (&ReplicaId, Term)> {
        self.terms.iter().map(|(id, term)| (id, *term))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<(ReplicaId, Term)> for TermSnapshot {
    fn from_iter<I: IntoIterator<Item = (ReplicaId, Term)>>(iter: I) -> TermSnapshot {
        TermSnapshot {
            version: 0,
            terms: iter.into_iter().collect(),
        }
    }
}
