//! Recurring availability rules as published by a host.
//!
//! Field names follow the host's published record format (camelCase), so a
//! rule record can be deserialized straight from its JSON form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who may book without the host confirming. Read by the authorization layer;
/// slot computation ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoAccept {
    #[default]
    All,
    Follows,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRules {
    pub auto_accept: AutoAccept,
}

/// One weekly recurring span, e.g. Mondays 09:00–17:00 in `Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotRule {
    /// 0 = Sunday ... 6 = Saturday.
    pub day_of_week: u8,
    /// `HH:MM`, local to `timezone`.
    pub start_time: String,
    /// `HH:MM`, local to `timezone`.
    pub end_time: String,
    /// IANA identifier. Empty means the engine's fallback zone.
    #[serde(default)]
    pub timezone: String,
}

impl TimeSlotRule {
    pub fn new(day_of_week: u8, start_time: &str, end_time: &str, timezone: &str) -> Self {
        Self {
            day_of_week,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            timezone: timezone.to_string(),
        }
    }
}

/// A host's bookable offer: which weekly spans, cut into slots of what length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Slot length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub buffer_before: u32,
    #[serde(default)]
    pub buffer_after: u32,
    #[serde(default)]
    pub booking_rules: BookingRules,
    pub time_slots: Vec<TimeSlotRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AvailabilityRule {
    /// A rule with no buffers that auto-accepts everyone.
    pub fn new(id: &str, duration: u32, time_slots: Vec<TimeSlotRule>) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            description: None,
            duration,
            buffer_before: 0,
            buffer_after: 0,
            booking_rules: BookingRules::default(),
            time_slots,
            created_at: None,
        }
    }

    pub fn with_buffers(mut self, before: u32, after: u32) -> Self {
        self.buffer_before = before;
        self.buffer_after = after;
        self
    }

    /// Distance between consecutive slot starts within one span, or `None`
    /// if the buffers are too large to add up.
    pub fn step_minutes(&self) -> Option<u32> {
        crate::generator::checked_step(self.duration, self.buffer_before, self.buffer_after)
    }

    /// The same span on each of `days`.
    pub fn weekly(
        id: &str,
        duration: u32,
        days: &[u8],
        start_time: &str,
        end_time: &str,
        timezone: &str,
    ) -> Self {
        let slots = days
            .iter()
            .map(|&d| TimeSlotRule::new(d, start_time, end_time, timezone))
            .collect();
        Self::new(id, duration, slots)
    }
}
