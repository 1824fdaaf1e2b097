use std::{cmp, fmt};

/// A shard term. Replicas with a term below the shard's maximum are stale.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize)]
pub struct Term(pub u64);

impl fmt::Display for Term {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl cmp::PartialEq<u64> for Term {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl cmp::PartialOrd<u64> for Term {
    fn partial_cmp(&self, other: &u64) -> Option<cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

#[test]
fn test_cmp_u64() {
    assert_eq!(Term(3), 3);
    assert!(Term(3) < 4);
    assert!(Term(3) > 2);
    assert_eq!(Term::default(), Term(0));
}
