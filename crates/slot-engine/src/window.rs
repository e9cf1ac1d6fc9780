//! Absolute time windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time;

/// A half-open interval `[start, end)` on the UTC timeline.
///
/// Generated slots, offered slots, and busy periods all share this shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Externally committed time, as reported by a busy source.
pub type BusyInterval = TimeWindow;

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap; windows that only touch do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        time::overlaps(self.start, self.end, other.start, other.end)
    }

    /// True if `self` lies entirely inside `[start, end)`.
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start >= start && self.end <= end
    }
}
