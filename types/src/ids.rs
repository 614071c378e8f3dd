use std::fmt;

/// Identifier the peer assigns to a registered pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(i64);

impl PatternId {
    /// Reply sent when a signature was never registered.
    pub const NOT_FOUND: PatternId = PatternId(0);

    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn is_not_found(self) -> bool {
        self == Self::NOT_FOUND
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
