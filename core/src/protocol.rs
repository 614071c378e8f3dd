//! Inbound line classification and outbound pattern encoding.
//!
//! The peer mixes prose and numbers freely, so parsing is permissive: a line
//! is matched on marker substrings, and numbers are pulled out with an
//! integer scanner wherever they appear.

use std::sync::LazyLock;

use regex::Regex;

use gridsig_types::{Pattern, PatternId, Segment};

pub const PHASE_TWO_MARKER: &str = "=== Phase 2 ===";
pub const PROMPT_TOKEN: &str = "N_";
pub const QUERY_MARKER: &str = "MutatedPattern:";
pub const SUCCESS_MARKER: &str = "All correct! Here is your flag:";
pub const PARTIAL_MARKER: &str = "You solved";

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("integer pattern is valid"));

/// Every integer token in `line`, in order. A token outside the `i64` range
/// is kept as `None` so callers never mistake a neighbour for it.
#[must_use]
pub fn extract_ints(line: &str) -> Vec<Option<i64>> {
    INTEGER
        .find_iter(line)
        .map(|m| m.as_str().parse().ok())
        .collect()
}

/// What a line means during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationLine {
    /// The phase separator. Takes precedence over everything else.
    PhaseBoundary,
    /// A registration prompt; the identifier is the last integer on the line.
    Prompt(PatternId),
    /// Looked like a prompt but carried no usable integer last.
    PromptWithoutId,
    Other,
}

#[must_use]
pub fn classify_registration(line: &str) -> RegistrationLine {
    if line.contains(PHASE_TWO_MARKER) {
        return RegistrationLine::PhaseBoundary;
    }
    if line.contains(PROMPT_TOKEN) && line.contains(':') {
        return match extract_ints(line).last() {
            Some(&Some(id)) => RegistrationLine::Prompt(PatternId::new(id)),
            _ => RegistrationLine::PromptWithoutId,
        };
    }
    RegistrationLine::Other
}

/// What a line means during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationLine {
    Query,
    Success,
    Partial,
    Other,
}

#[must_use]
pub fn classify_verification(line: &str) -> VerificationLine {
    if line.contains(QUERY_MARKER) {
        VerificationLine::Query
    } else if line.contains(SUCCESS_MARKER) {
        VerificationLine::Success
    } else if line.contains(PARTIAL_MARKER) {
        VerificationLine::Partial
    } else {
        VerificationLine::Other
    }
}

/// The first non-negative integer on a query's count line.
#[must_use]
pub fn parse_count(line: &str) -> Option<usize> {
    let first = (*extract_ints(line).first()?)?;
    usize::try_from(first).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentLineError {
    /// Fewer than four integers on the line.
    TooFewIntegers(usize),
    /// One of the first four integers does not fit in an `i64`.
    OutOfRange,
    /// Four integers that do not describe a valid grid segment.
    NotASegment([i64; 4]),
}

/// Parse a query segment line: the first four integers are `x1 y1 x2 y2`.
pub fn parse_segment(line: &str) -> Result<Segment, SegmentLineError> {
    let ints = extract_ints(line);
    let [x1, y1, x2, y2] = match ints.get(..4) {
        Some(&[Some(x1), Some(y1), Some(x2), Some(y2)]) => [x1, y1, x2, y2],
        Some(_) => return Err(SegmentLineError::OutOfRange),
        None => return Err(SegmentLineError::TooFewIntegers(ints.len())),
    };
    Segment::from_coords(x1, y1, x2, y2).ok_or(SegmentLineError::NotASegment([x1, y1, x2, y2]))
}

/// Wire lines for a pattern: the count, then one `x1 y1 x2 y2` line per
/// segment in sorted order.
#[must_use]
pub fn encode_pattern(pattern: &Pattern) -> Vec<String> {
    let mut lines = Vec::with_capacity(pattern.len() + 1);
    lines.push(pattern.len().to_string());
    lines.extend(pattern.iter().map(ToString::to_string));
    lines
}
