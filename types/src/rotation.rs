//! Quarter-turn rotations about the grid center.
//!
//! The four rotations form a cyclic group of order 4. The grid and its
//! segment set are closed under every element.

use crate::grid::{Point, Segment};

/// An element of the rotation group: `k` counter-clockwise quarter turns
/// about (1,1), where one quarter turn maps `(x, y)` to `(-y, x)` in
/// center-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Self::R0, Self::R90, Self::R180, Self::R270];

    /// Reduce any number of quarter turns (negative allowed) modulo 4.
    #[must_use]
    pub const fn from_quarter_turns(k: i64) -> Self {
        match k.rem_euclid(4) {
            0 => Self::R0,
            1 => Self::R90,
            2 => Self::R180,
            _ => Self::R270,
        }
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::R0 => 0,
            Self::R90 => 1,
            Self::R180 => 2,
            Self::R270 => 3,
        }
    }

    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns() as i64)
    }

    /// Apply `self`, then `next`.
    #[must_use]
    pub const fn then(self, next: Self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i64 + next.quarter_turns() as i64)
    }

    #[must_use]
    pub fn apply_point(self, point: Point) -> Point {
        let center = Point::CENTER;
        let mut x = i64::from(point.x()) - i64::from(center.x());
        let mut y = i64::from(point.y()) - i64::from(center.y());
        for _ in 0..self.quarter_turns() {
            (x, y) = (-y, x);
        }
        // The grid is symmetric about its center, so the image stays on it.
        match Point::new(x + i64::from(center.x()), y + i64::from(center.y())) {
            Some(rotated) => rotated,
            None => point,
        }
    }

    #[must_use]
    pub fn apply_segment(self, segment: Segment) -> Segment {
        let start = self.apply_point(segment.start());
        let end = self.apply_point(segment.end());
        // Rotation preserves distinctness and |dx|,|dy| up to swapping.
        Segment::new(start, end).unwrap_or(segment)
    }
}

/// Rotate `point` by `k` quarter turns (`k` taken mod 4).
#[must_use]
pub fn rotate_point(point: Point, k: i64) -> Point {
    Rotation::from_quarter_turns(k).apply_point(point)
}

/// Rotate both endpoints of `segment` by `k` quarter turns and re-sort them.
#[must_use]
pub fn rotate_segment(segment: Segment, k: i64) -> Segment {
    Rotation::from_quarter_turns(k).apply_segment(segment)
}
