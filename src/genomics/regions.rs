//! Closed-interval algebra over genomic coordinates.
//!
//! Excluded and low-confidence region masks arrive as unordered lists of
//! inclusive `(start, end)` pairs. Both [`coalesce`] and [`overlap`] reduce
//! them with a single sweep over start/end events.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Closed genomic interval `[start, end]`, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    /// First covered position.
    pub start: u64,
    /// Last covered position.
    pub end: u64,
}

/// Errors raised when constructing intervals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    /// The interval would end before it starts.
    #[error("invalid interval: start {start} > end {end}")]
    Inverted {
        /// Requested start.
        start: u64,
        /// Requested end.
        end: u64,
    },
}

impl Interval {
    /// Construct a closed interval, rejecting `start > end`.
    pub fn new(start: u64, end: u64) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Construct without validation. The caller guarantees `start <= end`.
    pub fn new_unchecked(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "interval start {start} > end {end}");
        Self { start, end }
    }

    /// Whether `position` lies within `[start, end]`.
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    /// Number of positions covered; `[0, u64::MAX]` covers 2^64.
    pub fn len(&self) -> u128 {
        u128::from(self.end - self.start) + 1
    }

    /// Closed intervals always cover at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<(u64, u64)> for Interval {
    fn from((start, end): (u64, u64)) -> Self {
        Self::new_unchecked(start, end)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Sub-interval covered by more than one input interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Overlap {
    /// Overlapping span.
    pub interval: Interval,
    /// Number of input intervals simultaneously active over the span.
    pub level: usize,
}

/// Boundary kind of a [`CoordinateEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Interval opens at this position.
    Start,
    /// Interval closes at this position.
    End,
}

/// Start or end boundary of one interval, alive only during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateEvent {
    /// Boundary kind.
    pub kind: EventKind,
    /// Genomic position of the boundary.
    pub position: u64,
}

/// Sweep order: ascending position, and at equal positions every `Start`
/// sorts before every `End`.
///
/// The tie-break keeps the active count above zero across a shared boundary,
/// so `[1, 5]` and `[5, 10]` coalesce into `[1, 10]`.
impl Ord for CoordinateEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |kind: EventKind| match kind {
            EventKind::Start => 0u8,
            EventKind::End => 1u8,
        };
        self.position
            .cmp(&other.position)
            .then_with(|| rank(self.kind).cmp(&rank(other.kind)))
    }
}

impl PartialOrd for CoordinateEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Expand intervals into start/end events in sweep order.
pub fn sweep_events(intervals: &[Interval]) -> Vec<CoordinateEvent> {
    let mut events = Vec::with_capacity(intervals.len() * 2);
    for interval in intervals {
        events.push(CoordinateEvent {
            kind: EventKind::Start,
            position: interval.start,
        });
        events.push(CoordinateEvent {
            kind: EventKind::End,
            position: interval.end,
        });
    }
    events.sort();
    events
}

/// Merge overlapping, nested and touching intervals into the minimal sorted
/// set of disjoint intervals with the same union.
pub fn coalesce(intervals: &[Interval]) -> Vec<Interval> {
    let mut merged = Vec::new();
    let mut active = 0usize;
    let mut pending_start = 0u64;

    for event in sweep_events(intervals) {
        match event.kind {
            EventKind::Start => {
                if active == 0 {
                    pending_start = event.position;
                }
                active += 1;
            }
            EventKind::End => {
                active -= 1;
                if active == 0 {
                    merged.push(Interval::new_unchecked(pending_start, event.position));
                }
            }
        }
    }

    merged
}

/// Find the spans where two or more intervals are active at once.
///
/// A span runs from the most recent start to the first end that follows it,
/// which is where the activity level peaks. Single-coverage regions are not
/// reported. Duplicate intervals each count towards the level.
pub fn overlap(intervals: &[Interval]) -> Vec<Overlap> {
    let mut out = Vec::new();
    let mut active = 0usize;
    let mut span_start = 0u64;
    let mut span_open = false;

    for event in sweep_events(intervals) {
        match event.kind {
            EventKind::Start => {
                active += 1;
                span_start = event.position;
                span_open = true;
            }
            EventKind::End => {
                if span_open && active > 1 {
                    out.push(Overlap {
                        interval: Interval::new_unchecked(span_start, event.position),
                        level: active,
                    });
                }
                span_open = false;
                active -= 1;
            }
        }
    }

    out
}

/// Whether `position` falls inside any region. Regions need not be sorted.
pub fn in_region(position: u64, regions: &[Interval]) -> bool {
    regions.iter().any(|region| region.contains(position))
}
