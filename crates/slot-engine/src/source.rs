//! External collaborators: where rules, busy time, and bookings come from.
//!
//! The engine only sees these traits, never a concrete transport. In-memory
//! implementations are provided for embedding, the CLI, and tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::error::SourceError;
use crate::rule::AvailabilityRule;
use crate::window::BusyInterval;

/// Supplies a host's recurring availability rules.
pub trait RuleSource: Send + Sync {
    fn fetch_rules(&self, host_id: &str) -> Result<Vec<AvailabilityRule>, SourceError>;
}

/// Supplies a host's committed time within `[start, end)`, e.g. from a
/// connected calendar's free/busy endpoint.
pub trait BusySource: Send + Sync {
    fn fetch_busy(
        &self,
        host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, SourceError>;
}

/// Result of an atomic booking insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Uuid),
    /// An active booking already holds `(host_id, window_start, window_end)`.
    AlreadyBooked,
}

/// Persistence for bookings.
///
/// `insert_unless_booked` must be atomic with respect to concurrent callers:
/// for any `(host_id, window_start, window_end)` at most one booking whose
/// status holds the window may exist.
///
/// The exact triple is the whole guarantee. Rules with different slot grids
/// can offer windows that overlap without being equal (`[09:00, 10:00)` and
/// `[09:30, 10:00)`); concurrent commits for those are not serialized against
/// each other, and both may be stored.
pub trait BookingStore: Send + Sync {
    /// Bookings that hold their window and overlap `[start, end)`.
    fn active_bookings(
        &self,
        host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, SourceError>;

    fn insert_unless_booked(&self, booking: Booking) -> Result<InsertOutcome, SourceError>;
}

// ── Rule storage ────────────────────────────────────────────────────────────

/// Rules held in memory, keyed by host. Unknown hosts have no rules.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRuleSource {
    rules: HashMap<String, Vec<AvailabilityRule>>,
}

impl InMemoryRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host_id: &str, rules: Vec<AvailabilityRule>) -> Self {
        self.rules.insert(host_id.to_string(), rules);
        self
    }

    pub fn insert(&mut self, host_id: &str, rules: Vec<AvailabilityRule>) {
        self.rules.insert(host_id.to_string(), rules);
    }
}

impl RuleSource for InMemoryRuleSource {
    fn fetch_rules(&self, host_id: &str) -> Result<Vec<AvailabilityRule>, SourceError> {
        Ok(self.rules.get(host_id).cloned().unwrap_or_default())
    }
}

// ── Busy time ───────────────────────────────────────────────────────────────

/// Fixed busy intervals per host. Intervals overlapping the requested range
/// are returned unclipped.
#[derive(Debug, Default, Clone)]
pub struct StaticBusySource {
    busy: HashMap<String, Vec<BusyInterval>>,
}

impl StaticBusySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host_id: &str, busy: Vec<BusyInterval>) -> Self {
        self.busy.insert(host_id.to_string(), busy);
        self
    }
}

impl BusySource for StaticBusySource {
    fn fetch_busy(
        &self,
        host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, SourceError> {
        Ok(self
            .busy
            .get(host_id)
            .map(|intervals| {
                intervals
                    .iter()
                    .filter(|b| b.start < end && start < b.end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Busy time as the booking guard sees it: the host's existing bookings plus,
/// when connected, their external calendar.
///
/// Either side failing fails the whole fetch, so the engine's fail-open policy
/// applies to the combined view.
pub struct BookedBusySource<'a> {
    store: &'a dyn BookingStore,
    external: Option<&'a dyn BusySource>,
}

impl<'a> BookedBusySource<'a> {
    pub fn new(store: &'a dyn BookingStore, external: Option<&'a dyn BusySource>) -> Self {
        Self { store, external }
    }
}

impl BusySource for BookedBusySource<'_> {
    fn fetch_busy(
        &self,
        host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, SourceError> {
        let mut busy: Vec<BusyInterval> = self
            .store
            .active_bookings(host_id, start, end)?
            .iter()
            .map(Booking::window)
            .collect();

        if let Some(external) = self.external {
            busy.extend(external.fetch_busy(host_id, start, end)?);
        }

        Ok(busy)
    }
}

// ── Booking storage ─────────────────────────────────────────────────────────

/// Bookings held in memory behind a mutex; the uniqueness check and the
/// insert happen under one lock.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: Mutex::new(bookings),
        }
    }

    /// Snapshot of every stored booking, in insertion order.
    pub fn bookings(&self) -> Vec<Booking> {
        self.lock().clone()
    }

    /// Mark a booking cancelled, freeing its window. Returns false if unknown.
    pub fn cancel(&self, id: Uuid) -> bool {
        let mut bookings = self.lock();
        match bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) => {
                booking.status = BookingStatus::Cancelled;
                true
            }
            None => false,
        }
    }

    pub fn into_bookings(self) -> Vec<Booking> {
        self.bookings
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Booking>> {
        self.bookings.lock().unwrap_or_else(|poisoned| {
            warn!("booking store mutex was poisoned; continuing");
            poisoned.into_inner()
        })
    }
}

impl BookingStore for InMemoryBookingStore {
    fn active_bookings(
        &self,
        host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, SourceError> {
        Ok(self
            .lock()
            .iter()
            .filter(|b| b.host_id == host_id && b.status.holds_window())
            .filter(|b| b.window_start < end && start < b.window_end)
            .cloned()
            .collect())
    }

    fn insert_unless_booked(&self, booking: Booking) -> Result<InsertOutcome, SourceError> {
        let mut bookings = self.lock();
        let taken = bookings
            .iter()
            .any(|existing| existing.status.holds_window() && existing.same_slot(&booking));
        if taken {
            return Ok(InsertOutcome::AlreadyBooked);
        }
        let id = booking.id;
        bookings.push(booking);
        Ok(InsertOutcome::Inserted(id))
    }
}
