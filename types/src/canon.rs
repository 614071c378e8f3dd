//! Rotation-invariant canonical signatures.
//!
//! A pattern's mask sets bit `i` for every segment with index `i`. The
//! signature is the smallest mask over the four rotations of the pattern, so
//! two patterns share a signature exactly when one is a rotation of the other.

use std::fmt;

use crate::grid::{Grid, SEGMENT_COUNT, Segment};
use crate::pattern::Pattern;
use crate::rotation::Rotation;

/// A 28-bit canonical signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Signature(u32);

impl Signature {
    pub const EMPTY: Signature = Signature(0);

    /// Wrap raw bits, rejecting anything outside `[0, 2^28)`.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits >> SEGMENT_COUNT == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Number of segments in the pattern this signature describes.
    #[must_use]
    pub const fn segment_count(self) -> u32 {
        self.0.count_ones()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes canonical signatures against a fixed segment table.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    grid: Grid,
}

impl Canonicalizer {
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn bit(&self, segment: Segment) -> u32 {
        // Every constructible Segment is indexed; see Grid::from_segments.
        self.grid.index_of(segment).map_or(0, |i| 1 << i)
    }

    /// Bitmask of `pattern` after applying `rotation`.
    #[must_use]
    pub fn mask(&self, pattern: &Pattern, rotation: Rotation) -> u32 {
        pattern
            .iter()
            .fold(0, |acc, &s| acc | self.bit(rotation.apply_segment(s)))
    }

    /// The minimum mask over all four rotations. The empty pattern maps to 0.
    #[must_use]
    pub fn signature(&self, pattern: &Pattern) -> Signature {
        let best = Rotation::ALL
            .iter()
            .map(|&r| self.mask(pattern, r))
            .min()
            .unwrap_or(0);
        Signature(best)
    }
}
