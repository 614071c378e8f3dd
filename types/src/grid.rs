//! Grid geometry: points, segments, and the fixed segment index.
//!
//! The grid is the 3×3 lattice `[0,2]×[0,2]`. A segment joins two distinct
//! points whose coordinate deltas are coprime, which rules out segments that
//! pass straight through a third grid point. There are exactly 28 of them.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Side length of the grid.
pub const GRID_SIZE: u8 = 3;

/// Number of grid points.
pub const POINT_COUNT: usize = 9;

/// Number of valid segments on a 3×3 grid.
pub const SEGMENT_COUNT: usize = 28;

/// A point on the 3×3 grid. Coordinates are always in `[0,2]`.
///
/// Ordering is lexicographic: `x` first, then `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    x: u8,
    y: u8,
}

impl Point {
    /// All 9 points in x-major order: (0,0), (0,1), (0,2), (1,0), ...
    pub const ALL: [Point; POINT_COUNT] = {
        let mut points = [Point { x: 0, y: 0 }; POINT_COUNT];
        let mut i = 0;
        while i < POINT_COUNT {
            points[i] = Point {
                x: (i / 3) as u8,
                y: (i % 3) as u8,
            };
            i += 1;
        }
        points
    };

    /// The rotation center.
    pub const CENTER: Point = Point { x: 1, y: 1 };

    /// Build a point from raw coordinates, or `None` if it is off the grid.
    #[must_use]
    pub fn new(x: i64, y: i64) -> Option<Self> {
        let x = u8::try_from(x).ok().filter(|&v| v < GRID_SIZE)?;
        let y = u8::try_from(y).ok().filter(|&v| v < GRID_SIZE)?;
        Some(Self { x, y })
    }

    #[must_use]
    pub const fn x(self) -> u8 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> u8 {
        self.y
    }

    /// Position of this point in [`Point::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.x as usize * GRID_SIZE as usize + self.y as usize
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Whether the raw coordinate pair `a`-`b` is a valid grid segment.
///
/// True iff the points differ, both lie in `[0,2]×[0,2]`, and
/// `gcd(|dx|, |dy|) == 1`.
#[must_use]
pub fn valid_segment(a: (i64, i64), b: (i64, i64)) -> bool {
    if a == b {
        return false;
    }
    if Point::new(a.0, a.1).is_none() || Point::new(b.0, b.1).is_none() {
        return false;
    }
    gcd(a.0.abs_diff(b.0), a.1.abs_diff(b.1)) == 1
}

/// An unordered pair of grid points, stored with `start < end`.
///
/// Only valid segments can be constructed, so every `Segment` value has an
/// entry in the grid's segment index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    /// Join two points, normalizing endpoint order. `None` if invalid.
    #[must_use]
    pub fn new(a: Point, b: Point) -> Option<Self> {
        let raw = |p: Point| (i64::from(p.x), i64::from(p.y));
        if !valid_segment(raw(a), raw(b)) {
            return None;
        }
        let (start, end) = match a.cmp(&b) {
            Ordering::Less => (a, b),
            _ => (b, a),
        };
        Some(Self { start, end })
    }

    /// Build a segment from four raw coordinates `x1 y1 x2 y2`.
    #[must_use]
    pub fn from_coords(x1: i64, y1: i64, x2: i64, y2: i64) -> Option<Self> {
        Self::new(Point::new(x1, y1)?, Point::new(x2, y2)?)
    }

    #[must_use]
    pub const fn start(self) -> Point {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> Point {
        self.end
    }

    /// Absolute coordinate deltas `(dx, dy)`.
    #[must_use]
    pub fn deltas(self) -> (u8, u8) {
        (
            self.start.x.abs_diff(self.end.x),
            self.start.y.abs_diff(self.end.y),
        )
    }
}

/// Wire form: `x1 y1 x2 y2`.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.start.x, self.start.y, self.end.x, self.end.y
        )
    }
}

/// Enumerate all valid segments in a fixed order.
///
/// Walks every unordered pair `i < j` of [`Point::ALL`] and keeps the valid
/// ones. The position in the returned sequence is the segment's index.
#[must_use]
pub fn all_segments() -> Vec<Segment> {
    let mut segments = Vec::with_capacity(SEGMENT_COUNT);
    for (i, &a) in Point::ALL.iter().enumerate() {
        for &b in &Point::ALL[i + 1..] {
            if let Some(segment) = Segment::new(a, b) {
                segments.push(segment);
            }
        }
    }
    segments
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must have exactly {expected} valid segments, found {found}")]
    SegmentCount { expected: usize, found: usize },
    #[error("segment {0} appears more than once in the segment table")]
    DuplicateSegment(Segment),
}

/// The immutable segment table: the 28 valid segments and their indices.
#[derive(Debug, Clone)]
pub struct Grid {
    segments: Vec<Segment>,
    // index[start][end] for start < end
    index: [[Option<u8>; POINT_COUNT]; POINT_COUNT],
}

impl Grid {
    /// Build the standard segment table.
    ///
    /// Fails if the enumeration does not produce exactly
    /// [`SEGMENT_COUNT`] segments.
    pub fn new() -> Result<Self, GridError> {
        Self::from_segments(all_segments())
    }

    /// Build a segment table from an explicit sequence.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, GridError> {
        if segments.len() != SEGMENT_COUNT {
            return Err(GridError::SegmentCount {
                expected: SEGMENT_COUNT,
                found: segments.len(),
            });
        }

        let mut index = [[None; POINT_COUNT]; POINT_COUNT];
        for (i, segment) in segments.iter().enumerate() {
            let slot = &mut index[segment.start.index()][segment.end.index()];
            if slot.is_some() {
                return Err(GridError::DuplicateSegment(*segment));
            }
            *slot = Some(i as u8);
        }

        Ok(Self { segments, index })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn segment(&self, index: usize) -> Option<Segment> {
        self.segments.get(index).copied()
    }

    #[must_use]
    pub fn index_of(&self, segment: Segment) -> Option<usize> {
        self.index[segment.start.index()][segment.end.index()].map(usize::from)
    }
}
