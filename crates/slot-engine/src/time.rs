//! Time-of-day arithmetic.
//!
//! Rules declare their spans as `HH:MM` wall-clock strings. Everything below
//! the rule layer works in whole minutes from local midnight, so slot tiling
//! never touches floating point.

use chrono::Weekday;

use crate::error::{EngineError, Result};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Parse a strict `HH:MM` string into minutes since midnight.
///
/// Hours must be `00..=23` and minutes `00..=59`, both exactly two digits.
///
/// # Errors
/// Returns `EngineError::InvalidFormat` for anything else.
pub fn time_of_day_to_minutes(s: &str) -> Result<u32> {
    let invalid = || EngineError::InvalidFormat(s.to_string());

    let (hh, mm) = s.split_once(':').ok_or_else(invalid)?;
    if hh.len() != 2 || mm.len() != 2 {
        return Err(invalid());
    }
    if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: u32 = hh.parse().map_err(|_| invalid())?;
    let minutes: u32 = mm.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as `HH:MM`.
///
/// Values past the end of the day are not wrapped: `1500` renders as `25:00`.
pub fn minutes_to_time_of_day(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Half-open interval overlap: `[start1, end1)` and `[start2, end2)` overlap
/// iff `start1 < end2 && start2 < end1`.
///
/// Intervals that only touch at an endpoint do not overlap.
pub fn overlaps<T: PartialOrd>(start1: T, end1: T, start2: T, end2: T) -> bool {
    start1 < end2 && start2 < end1
}

/// Day-of-week index used by availability rules (0 = Sunday ... 6 = Saturday).
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// English name for a rule day-of-week index.
pub fn day_name(day_of_week: u8) -> Option<&'static str> {
    DAY_NAMES.get(day_of_week as usize).copied()
}
