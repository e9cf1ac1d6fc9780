//! Tests for expanding availability rules into candidate slots.

use chrono::{DateTime, TimeZone, Utc};
use slot_engine::config::EngineConfig;
use slot_engine::dst::DstPolicy;
use slot_engine::error::EngineError;
use slot_engine::generator::{generate_slots, tile_span_minutes};
use slot_engine::rule::{AvailabilityRule, TimeSlotRule};
use slot_engine::window::TimeWindow;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}

fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeWindow {
    TimeWindow::new(start, end)
}

/// Mon–Fri 09:00–17:00 UTC.
fn weekdays_nine_to_five(duration: u32) -> AvailabilityRule {
    AvailabilityRule::weekly("default", duration, &[1, 2, 3, 4, 5], "09:00", "17:00", "UTC")
}

fn generate(rules: &[AvailabilityRule], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimeWindow> {
    generate_slots(rules, start, end, &EngineConfig::default()).unwrap()
}

// ── Span tiling ─────────────────────────────────────────────────────────────

#[test]
fn tiling_without_buffers_fills_the_span() {
    // 09:00–10:00, 30 min
    assert_eq!(tile_span_minutes(540, 600, 30, 0, 0), vec![540, 570]);
}

#[test]
fn tiling_with_buffers_steps_past_them() {
    // 09:00–12:00, 30 min, 10 before / 5 after: 09:10, 09:55, 10:40, 11:25
    assert_eq!(
        tile_span_minutes(540, 720, 30, 10, 5),
        vec![550, 595, 640, 685]
    );
}

#[test]
fn tiling_drops_a_trailing_partial_slot() {
    // 09:00–10:15 with 30 min slots: 09:00, 09:30; 10:00 would end at 10:30
    assert_eq!(tile_span_minutes(540, 615, 30, 0, 0), vec![540, 570]);
}

#[test]
fn tiling_inverted_or_empty_span_produces_nothing() {
    assert!(tile_span_minutes(600, 540, 30, 0, 0).is_empty());
    assert!(tile_span_minutes(540, 540, 30, 0, 0).is_empty());
}

#[test]
fn tiling_zero_duration_produces_nothing() {
    assert!(tile_span_minutes(540, 600, 0, 0, 0).is_empty());
}

#[test]
fn tiling_with_overflowing_step_produces_nothing() {
    assert!(tile_span_minutes(0, u32::MAX, 30, u32::MAX, 0).is_empty());
    assert!(tile_span_minutes(0, u32::MAX, 30, 0, u32::MAX - 29).is_empty());
}

#[test]
fn tiling_stops_when_the_next_start_would_overflow() {
    let step_to_end = u32::MAX - 60;
    assert_eq!(
        tile_span_minutes(0, u32::MAX, 30, 0, step_to_end),
        vec![0, u32::MAX - 30]
    );
}

#[test]
fn step_minutes_reports_overflow() {
    let rule = AvailabilityRule::weekly("r", 30, &[1], "09:00", "10:00", "UTC");
    assert_eq!(rule.clone().with_buffers(10, 5).step_minutes(), Some(45));
    assert_eq!(rule.with_buffers(0, u32::MAX - 29).step_minutes(), None);
}

// ── Basic expansion ─────────────────────────────────────────────────────────

#[test]
fn monday_morning_hour_yields_two_half_hour_slots() {
    // 2026-03-16 is a Monday.
    let slots = generate(
        &[weekdays_nine_to_five(30)],
        utc(2026, 3, 16, 9, 0),
        utc(2026, 3, 16, 10, 0),
    );

    assert_eq!(
        slots,
        vec![
            window(utc(2026, 3, 16, 9, 0), utc(2026, 3, 16, 9, 30)),
            window(utc(2026, 3, 16, 9, 30), utc(2026, 3, 16, 10, 0)),
        ]
    );
}

#[test]
fn full_work_week_yields_sixteen_slots_per_day() {
    let slots = generate(
        &[weekdays_nine_to_five(30)],
        utc(2026, 3, 16, 0, 0),
        utc(2026, 3, 23, 0, 0),
    );

    assert_eq!(slots.len(), 5 * 16);
    assert_eq!(slots[0].start, utc(2026, 3, 16, 9, 0));
    assert_eq!(slots[79].end, utc(2026, 3, 20, 17, 0));
}

#[test]
fn weekend_produces_no_slots() {
    // Sat 2026-03-21 – Mon 2026-03-23 00:00
    let slots = generate(
        &[weekdays_nine_to_five(30)],
        utc(2026, 3, 21, 0, 0),
        utc(2026, 3, 23, 0, 0),
    );
    assert!(slots.is_empty());
}

#[test]
fn partial_boundary_slots_are_dropped_not_clipped() {
    let slots = generate(
        &[weekdays_nine_to_five(30)],
        utc(2026, 3, 16, 9, 15),
        utc(2026, 3, 16, 10, 45),
    );

    assert_eq!(
        slots,
        vec![
            window(utc(2026, 3, 16, 9, 30), utc(2026, 3, 16, 10, 0)),
            window(utc(2026, 3, 16, 10, 0), utc(2026, 3, 16, 10, 30)),
        ]
    );
}

#[test]
fn buffers_leave_room_for_only_one_slot_in_an_hour() {
    let rule = AvailabilityRule::weekly("buffered", 30, &[1], "09:00", "10:00", "UTC")
        .with_buffers(10, 5);

    let slots = generate(&[rule], utc(2026, 3, 16, 0, 0), utc(2026, 3, 17, 0, 0));

    // 09:10–09:40; the next would start 09:55 and end 10:25 > 10:00.
    assert_eq!(
        slots,
        vec![window(utc(2026, 3, 16, 9, 10), utc(2026, 3, 16, 9, 40))]
    );
}

#[test]
fn empty_range_yields_nothing() {
    let at = utc(2026, 3, 16, 9, 0);
    assert!(generate(&[weekdays_nine_to_five(30)], at, at).is_empty());
}

#[test]
fn inverted_range_is_rejected() {
    let result = generate_slots(
        &[weekdays_nine_to_five(30)],
        utc(2026, 3, 16, 10, 0),
        utc(2026, 3, 16, 9, 0),
        &EngineConfig::default(),
    );
    assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
}

#[test]
fn overlapping_rules_produce_duplicate_offers() {
    let rules = vec![weekdays_nine_to_five(30), weekdays_nine_to_five(30)];
    let slots = generate(&rules, utc(2026, 3, 16, 9, 0), utc(2026, 3, 16, 10, 0));

    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0], slots[1]);
    assert_eq!(slots[2], slots[3]);
}

#[test]
fn output_is_sorted_across_rules() {
    let afternoon = AvailabilityRule::weekly("pm", 60, &[1], "13:00", "15:00", "UTC");
    let morning = AvailabilityRule::weekly("am", 60, &[1], "08:00", "10:00", "UTC");

    let slots = generate(
        &[afternoon, morning],
        utc(2026, 3, 16, 0, 0),
        utc(2026, 3, 17, 0, 0),
    );

    let starts: Vec<_> = slots.iter().map(|w| w.start).collect();
    assert_eq!(
        starts,
        vec![
            utc(2026, 3, 16, 8, 0),
            utc(2026, 3, 16, 9, 0),
            utc(2026, 3, 16, 13, 0),
            utc(2026, 3, 16, 14, 0),
        ]
    );
}

// ── Invalid time-slot rules ─────────────────────────────────────────────────

#[test]
fn malformed_time_slot_is_skipped_others_survive() {
    let rule = AvailabilityRule::new(
        "mixed",
        60,
        vec![
            TimeSlotRule::new(1, "9am", "17:00", "UTC"),
            TimeSlotRule::new(1, "10:00", "12:00", "UTC"),
        ],
    );

    let slots = generate(&[rule], utc(2026, 3, 16, 0, 0), utc(2026, 3, 17, 0, 0));

    assert_eq!(
        slots,
        vec![
            window(utc(2026, 3, 16, 10, 0), utc(2026, 3, 16, 11, 0)),
            window(utc(2026, 3, 16, 11, 0), utc(2026, 3, 16, 12, 0)),
        ]
    );
}

#[test]
fn unknown_timezone_and_bad_weekday_are_skipped() {
    let rule = AvailabilityRule::new(
        "mixed",
        60,
        vec![
            TimeSlotRule::new(1, "09:00", "10:00", "Mars/Olympus_Mons"),
            TimeSlotRule::new(9, "09:00", "10:00", "UTC"),
            TimeSlotRule::new(1, "15:00", "16:00", "UTC"),
        ],
    );

    let slots = generate(&[rule], utc(2026, 3, 16, 0, 0), utc(2026, 3, 17, 0, 0));

    assert_eq!(
        slots,
        vec![window(utc(2026, 3, 16, 15, 0), utc(2026, 3, 16, 16, 0))]
    );
}

#[test]
fn zero_duration_rule_is_skipped() {
    let broken = AvailabilityRule::weekly("broken", 0, &[1], "09:00", "17:00", "UTC");
    let good = AvailabilityRule::weekly("good", 60, &[1], "09:00", "10:00", "UTC");

    let slots = generate(&[broken, good], utc(2026, 3, 16, 0, 0), utc(2026, 3, 17, 0, 0));

    assert_eq!(slots.len(), 1);
}

// ── Timezones ───────────────────────────────────────────────────────────────

#[test]
fn rules_in_different_timezones_normalize_independently() {
    // 2026-03-16: Berlin is UTC+1 (CET), DST starts 2026-03-29.
    let berlin = AvailabilityRule::weekly("berlin", 60, &[1], "09:00", "10:00", "Europe/Berlin");
    let london = AvailabilityRule::weekly("london", 60, &[1], "09:00", "10:00", "Europe/London");

    let slots = generate(
        &[berlin, london],
        utc(2026, 3, 16, 0, 0),
        utc(2026, 3, 17, 0, 0),
    );

    assert_eq!(
        slots,
        vec![
            window(utc(2026, 3, 16, 8, 0), utc(2026, 3, 16, 9, 0)),
            window(utc(2026, 3, 16, 9, 0), utc(2026, 3, 16, 10, 0)),
        ]
    );
}

#[test]
fn local_weekday_is_used_not_utc_weekday() {
    // Monday 09:00 in Tokyo is Monday 00:00 UTC; the range starts on Sunday UTC.
    let tokyo = AvailabilityRule::weekly("tokyo", 60, &[1], "09:00", "10:00", "Asia/Tokyo");

    let slots = generate(&[tokyo], utc(2026, 3, 15, 12, 0), utc(2026, 3, 16, 12, 0));

    assert_eq!(
        slots,
        vec![window(utc(2026, 3, 16, 0, 0), utc(2026, 3, 16, 1, 0))]
    );
}

#[test]
fn empty_timezone_uses_configured_fallback() {
    let rule = AvailabilityRule::weekly("fallback", 60, &[1], "09:00", "10:00", "");
    let config = EngineConfig {
        fallback_timezone: chrono_tz::Europe::Berlin,
        ..EngineConfig::default()
    };

    let slots = generate_slots(&[rule], utc(2026, 3, 16, 0, 0), utc(2026, 3, 17, 0, 0), &config)
        .unwrap();

    assert_eq!(
        slots,
        vec![window(utc(2026, 3, 16, 8, 0), utc(2026, 3, 16, 9, 0))]
    );
}

// ── DST ─────────────────────────────────────────────────────────────────────

#[test]
fn span_across_spring_forward_tiles_absolute_time() {
    // 2026-03-08 (Sunday): New York jumps 02:00 EST -> 03:00 EDT.
    // 01:00 EST = 06:00Z, 04:00 EDT = 08:00Z: only two hours exist.
    let rule = AvailabilityRule::weekly("ny", 60, &[0], "01:00", "04:00", "America/New_York");

    let slots = generate(&[rule], utc(2026, 3, 8, 0, 0), utc(2026, 3, 9, 0, 0));

    assert_eq!(
        slots,
        vec![
            window(utc(2026, 3, 8, 6, 0), utc(2026, 3, 8, 7, 0)),
            window(utc(2026, 3, 8, 7, 0), utc(2026, 3, 8, 8, 0)),
        ]
    );
}

#[test]
fn span_starting_in_gap_shifts_forward_by_default() {
    // 02:30 does not exist; shifted to 03:30 EDT = 07:30Z.
    let rule = AvailabilityRule::weekly("ny", 30, &[0], "02:30", "04:00", "America/New_York");

    let slots = generate(&[rule], utc(2026, 3, 8, 0, 0), utc(2026, 3, 9, 0, 0));

    assert_eq!(
        slots,
        vec![window(utc(2026, 3, 8, 7, 30), utc(2026, 3, 8, 8, 0))]
    );
}

#[test]
fn span_starting_in_gap_is_dropped_under_skip_policy() {
    let rule = AvailabilityRule::weekly("ny", 30, &[0], "02:30", "04:00", "America/New_York");
    let config = EngineConfig {
        dst_policy: DstPolicy::Skip,
        ..EngineConfig::default()
    };

    let slots =
        generate_slots(&[rule], utc(2026, 3, 8, 0, 0), utc(2026, 3, 9, 0, 0), &config).unwrap();

    assert!(slots.is_empty());
}

#[test]
fn ambiguous_fall_back_boundary_uses_earlier_instant() {
    // 2026-11-01 (Sunday): New York repeats 01:00–02:00.
    // 01:30 resolves to EDT (05:30Z); 03:00 EST = 08:00Z.
    let rule = AvailabilityRule::weekly("ny", 30, &[0], "01:30", "03:00", "America/New_York");

    let slots = generate(&[rule], utc(2026, 11, 1, 0, 0), utc(2026, 11, 2, 0, 0));

    assert_eq!(slots.len(), 5);
    assert_eq!(slots[0].start, utc(2026, 11, 1, 5, 30));
    assert_eq!(slots[4].end, utc(2026, 11, 1, 8, 0));
}

#[test]
fn rule_with_huge_buffers_is_skipped_others_survive() {
    let huge: AvailabilityRule = serde_json::from_str(
        r#"{
            "id": "huge",
            "duration": 30,
            "bufferBefore": 4294967295,
            "timeSlots": [
                { "dayOfWeek": 1, "startTime": "09:00", "endTime": "17:00", "timezone": "UTC" }
            ]
        }"#,
    )
    .unwrap();
    let wrapping = AvailabilityRule::weekly("wrapping", 30, &[1], "09:00", "17:00", "UTC")
        .with_buffers(0, u32::MAX - 29);
    let good = AvailabilityRule::weekly("good", 60, &[1], "09:00", "10:00", "UTC");

    let slots = generate(
        &[huge, wrapping, good],
        utc(2026, 3, 16, 0, 0),
        utc(2026, 3, 17, 0, 0),
    );

    assert_eq!(
        slots,
        vec![window(utc(2026, 3, 16, 9, 0), utc(2026, 3, 16, 10, 0))]
    );
}
