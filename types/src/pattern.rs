//! Patterns: sets of grid segments.

use std::collections::BTreeSet;
use std::collections::btree_set;

use crate::grid::Segment;
use crate::rotation::Rotation;

/// A set of segments. Duplicates collapse; iteration is in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern(BTreeSet<Segment>);

impl Pattern {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment. Returns `false` if it was already present.
    pub fn insert(&mut self, segment: Segment) -> bool {
        self.0.insert(segment)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Segment> {
        self.0.iter()
    }

    /// The image of this pattern under `rotation`.
    #[must_use]
    pub fn rotated(&self, rotation: Rotation) -> Self {
        self.iter().map(|&s| rotation.apply_segment(s)).collect()
    }
}

impl FromIterator<Segment> for Pattern {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Segment;
    type IntoIter = btree_set::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
