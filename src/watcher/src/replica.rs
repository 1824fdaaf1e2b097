use std::fmt;
use std::sync::Arc;

/// Names one replica within a shard.
///
/// This is the only key a [`TermWatcher`](crate::TermWatcher) is compared
/// and hashed by.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ReplicaId(Arc<str>);

impl ReplicaId {
    pub fn new(name: impl AsRef<str>) -> ReplicaId {
        ReplicaId(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReplicaId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ReplicaId({:?})", &*self.0)
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl From<&str> for ReplicaId {
    fn from(src: &str) -> ReplicaId {
        ReplicaId::new(src)
    }
}

impl From<String> for ReplicaId {
    fn from(src: String) -> ReplicaId {
        ReplicaId(Arc::from(src))
    }
}

impl serde::Serialize for ReplicaId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[test]
fn test_eq_by_name() {
    let a = ReplicaId::from("shard1_replica1");
    let b = ReplicaId::from(String::from("shard1_replica1"));

    assert_eq!(a, b);
    assert_ne!(a, ReplicaId::from("shard1_replica2"));
    assert_eq!(a.to_string(), "shard1_replica1");
}
