//! Remove candidate windows that collide with busy time.
//!
//! Adjacent windows (where one ends exactly when another starts) are NOT
//! collisions.

use crate::window::{BusyInterval, TimeWindow};

/// Keep the candidates that overlap no busy interval.
///
/// Inputs need not be sorted; surviving candidates keep their input order.
pub fn filter_busy(candidates: &[TimeWindow], busy: &[BusyInterval]) -> Vec<TimeWindow> {
    candidates
        .iter()
        .filter(|candidate| !busy.iter().any(|b| candidate.overlaps(b)))
        .copied()
        .collect()
}

/// All busy intervals that block `window`, in input order.
pub fn overlapping_busy<'a>(
    window: &TimeWindow,
    busy: &'a [BusyInterval],
) -> Vec<&'a BusyInterval> {
    busy.iter().filter(|b| window.overlaps(b)).collect()
}
