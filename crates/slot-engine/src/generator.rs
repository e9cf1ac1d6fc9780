//! Slot generation -- expands weekly availability rules into concrete,
//! duration-quantized windows inside an absolute query range.
//!
//! Each time-slot rule is interpreted in its own timezone: the local calendar
//! days touched by the query range are walked, and every day whose weekday
//! matches contributes one span, tiled into slots of the rule's duration with
//! the rule's buffers between them. Only slots lying entirely inside the
//! query range are emitted; boundary slots are dropped, never clipped.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dst::resolve_local;
use crate::error::{EngineError, Result};
use crate::rule::{AvailabilityRule, TimeSlotRule};
use crate::time::{self, time_of_day_to_minutes};
use crate::window::TimeWindow;

/// Tile a single `[span_start, span_end)` span, in minutes from midnight.
///
/// The first slot starts at `span_start + buffer_before`; each following one
/// starts `duration + buffer_before + buffer_after` later. A slot is produced
/// only while it ends at or before `span_end`. Returns slot start offsets.
///
/// A zero `duration` produces nothing, and tiling stops at the first offset
/// that would not fit in a `u32`.
pub fn tile_span_minutes(
    span_start: u32,
    span_end: u32,
    duration: u32,
    buffer_before: u32,
    buffer_after: u32,
) -> Vec<u32> {
    if duration == 0 {
        return Vec::new();
    }
    let Some(step) = checked_step(duration, buffer_before, buffer_after) else {
        return Vec::new();
    };

    let mut starts = Vec::new();
    let mut cursor = span_start.checked_add(buffer_before);
    while let Some(start) = cursor {
        match start.checked_add(duration) {
            Some(end) if end <= span_end => starts.push(start),
            _ => break,
        }
        cursor = start.checked_add(step);
    }
    starts
}

/// `duration + buffer_before + buffer_after`, or `None` on overflow.
pub(crate) fn checked_step(duration: u32, buffer_before: u32, buffer_after: u32) -> Option<u32> {
    duration.checked_add(buffer_before)?.checked_add(buffer_after)
}

/// Expand `rules` into candidate windows inside `[range_start, range_end)`.
///
/// The result is sorted by `(start, end)`. Overlapping rules may produce
/// overlapping or identical windows; these are kept as distinct offers.
///
/// A time-slot rule with a malformed time, an out-of-range day, or an unknown
/// timezone is skipped (and logged) without affecting the others. So is a
/// whole rule whose slot step does not fit in a `u32`.
///
/// # Errors
/// Returns `EngineError::InvalidRange` if `range_start > range_end`.
pub fn generate_slots(
    rules: &[AvailabilityRule],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Vec<TimeWindow>> {
    if range_start > range_end {
        return Err(EngineError::InvalidRange {
            start: range_start,
            end: range_end,
        });
    }

    let mut windows = Vec::new();

    for rule in rules {
        if rule.duration == 0 {
            warn!(rule_id = %rule.id, "skipping availability rule with zero slot duration");
            continue;
        }
        if rule.step_minutes().is_none() {
            warn!(
                rule_id = %rule.id,
                duration = rule.duration,
                buffer_before = rule.buffer_before,
                buffer_after = rule.buffer_after,
                "skipping availability rule whose slot step overflows"
            );
            continue;
        }
        for slot in &rule.time_slots {
            if let Err(err) = expand_time_slot(rule, slot, range_start, range_end, config, &mut windows)
            {
                warn!(
                    rule_id = %rule.id,
                    day_of_week = slot.day_of_week,
                    start_time = %slot.start_time,
                    end_time = %slot.end_time,
                    error = %err,
                    "skipping invalid time slot rule"
                );
            }
        }
    }

    // Stable: duplicates from overlapping rules keep their rule order.
    windows.sort_by_key(|w| (w.start, w.end));

    debug!(
        candidates = windows.len(),
        %range_start,
        %range_end,
        "generated candidate slots"
    );

    Ok(windows)
}

fn expand_time_slot(
    rule: &AvailabilityRule,
    slot: &TimeSlotRule,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    config: &EngineConfig,
    out: &mut Vec<TimeWindow>,
) -> Result<()> {
    if slot.day_of_week > 6 {
        return Err(EngineError::InvalidFormat(format!(
            "dayOfWeek {} out of range 0-6",
            slot.day_of_week
        )));
    }
    let start_minutes = time_of_day_to_minutes(&slot.start_time)?;
    let end_minutes = time_of_day_to_minutes(&slot.end_time)?;
    let tz = resolve_timezone(&slot.timezone, config)?;
    let duration = Duration::minutes(i64::from(rule.duration));

    let first_day = range_start.with_timezone(&tz).date_naive();
    let last_day = range_end.with_timezone(&tz).date_naive();

    for day in days_inclusive(first_day, last_day) {
        if time::weekday_index(day.weekday()) != slot.day_of_week {
            continue;
        }
        let Some((span_start, span_end)) =
            resolve_span(tz, day, start_minutes, end_minutes, config)
        else {
            continue;
        };
        if span_end <= span_start {
            continue;
        }

        // Tile on the absolute timeline so a DST shift inside the span
        // changes how many slots fit rather than their length.
        let span_len = u32::try_from((span_end - span_start).num_minutes()).unwrap_or(0);
        let offsets = tile_span_minutes(
            0,
            span_len,
            rule.duration,
            rule.buffer_before,
            rule.buffer_after,
        );
        for offset in offsets {
            let start = span_start + Duration::minutes(i64::from(offset));
            let window = TimeWindow::new(start, start + duration);
            if window.within(range_start, range_end) {
                out.push(window);
            }
        }
    }

    Ok(())
}

fn resolve_span(
    tz: Tz,
    day: NaiveDate,
    start_minutes: u32,
    end_minutes: u32,
    config: &EngineConfig,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let midnight = day.and_time(NaiveTime::MIN);
    let start = resolve_local(
        tz,
        midnight + Duration::minutes(i64::from(start_minutes)),
        config.dst_policy,
    )?;
    let end = resolve_local(
        tz,
        midnight + Duration::minutes(i64::from(end_minutes)),
        config.dst_policy,
    )?;
    Some((start, end))
}

fn resolve_timezone(name: &str, config: &EngineConfig) -> Result<Tz> {
    if name.is_empty() {
        return Ok(config.fallback_timezone);
    }
    name.parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

fn days_inclusive(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(first), |d| d.checked_add_days(Days::new(1)))
        .take_while(move |d| *d <= last)
}
