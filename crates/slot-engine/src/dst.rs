//! DST transition policies for rule span boundaries.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for span boundaries that fall in a DST gap (e.g. 02:30 during
/// spring forward). Ambiguous times (fall back) always resolve to the earlier
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DstPolicy {
    /// Drop the span for that day.
    Skip,
    /// Move the boundary forward by the length of the gap
    #[default]
    ShiftForward,
}

/// Resolve a local wall-clock time in `tz` to a UTC instant.
///
/// Returns `None` only when the time does not exist and the policy is `Skip`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => shift_past_gap(tz, local),
        },
    }
}

// Gaps are at most a few hours. Step back in 15-minute increments to the last
// valid local time before the gap and reuse its UTC offset, which lands the
// boundary the length of the gap later on the wall clock.
fn shift_past_gap(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let before = (1..=16).find_map(|i| {
        tz.from_local_datetime(&(local - Duration::minutes(15 * i)))
            .earliest()
    })?;
    let offset = before.naive_local() - before.naive_utc();
    Some((local - offset).and_utc())
}
