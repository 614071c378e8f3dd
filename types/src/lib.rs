//! Core domain types for gridsig.
//!
//! This crate contains the pure geometry of the challenge with no IO and minimal
//! dependencies:
//!
//! - **`grid`**: the 9 points of the 3×3 grid, the 28 valid segments, and the
//!   fixed segment index used for bit signatures
//! - **`rotation`**: the four-element cyclic group of quarter turns about (1,1)
//! - **`pattern`**: sets of segments
//! - **`canon`**: rotation-invariant canonical signatures
//! - **`ids`**: peer-assigned pattern identifiers

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod canon;
pub mod grid;
mod ids;
pub mod pattern;
pub mod rotation;

pub use canon::{Canonicalizer, Signature};
pub use grid::{
    GRID_SIZE, Grid, GridError, POINT_COUNT, Point, SEGMENT_COUNT, Segment, all_segments,
    valid_segment,
};
pub use ids::PatternId;
pub use pattern::Pattern;
pub use rotation::{Rotation, rotate_point, rotate_segment};
