//! Ordered class pair, used as the containment cache key.

use std::fmt;

use modelgraph_meta::ClassId;

/// An ordered pair of classes with value semantics.
///
/// Two pairs are equal iff both components are equal, in order. For
/// containment resolution `first` is the container and `second` the
/// contained class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassPair {
    pub first: ClassId,
    pub second: ClassId,
}

impl ClassPair {
    /// Obtain a pair.
    pub fn of(first: ClassId, second: ClassId) -> Self {
        Self { first, second }
    }
}

impl fmt::Display for ClassPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.first, self.second)
    }
}
