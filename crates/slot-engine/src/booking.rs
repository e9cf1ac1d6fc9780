//! Booking claims and the records a booking store keeps for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::window::TimeWindow;

/// A request to book one exact window of a host's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingClaim {
    pub host_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub booker_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BookingClaim {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.window_start, self.window_end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    #[default]
    Confirmed,
    Cancelled,
    Rescheduled,
}

impl BookingStatus {
    /// Whether a booking in this state still occupies its window.
    pub fn holds_window(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub host_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub booker_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_claim(claim: &BookingClaim, status: BookingStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id: claim.host_id.clone(),
            window_start: claim.window_start,
            window_end: claim.window_end,
            booker_contact: claim.booker_contact.clone(),
            note: claim.note.clone(),
            status,
            created_at,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.window_start, self.window_end)
    }

    /// True if `self` and `other` claim the same host and the exact same window.
    pub fn same_slot(&self, other: &Booking) -> bool {
        self.host_id == other.host_id
            && self.window_start == other.window_start
            && self.window_end == other.window_end
    }
}
