//! The write path: accept a booking only if its window is still offered.
//!
//! A client books a window it saw in an earlier availability read. Between
//! that read and the booking request the host's calendar may have changed,
//! so the guard re-runs the read path over exactly the requested window and
//! accepts only if that exact window comes back. Nothing is cached between
//! calls.
//!
//! Two requests for the same window can both pass re-derivation. The final
//! arbiter is the booking store's atomic `insert_unless_booked`; [`ConflictGuard::commit`]
//! maps a lost insert race to the same rejection as a failed re-derivation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::availability::AvailabilityEngine;
use crate::booking::{Booking, BookingClaim, BookingStatus};
use crate::error::{EngineError, Result};
use crate::source::{BookedBusySource, BookingStore, BusySource, InsertOutcome};

/// Why a claim was turned away. Not a fault: the booker should pick another time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    SlotUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDecision {
    Accepted,
    Rejected(RejectReason),
}

impl BookingDecision {
    pub fn is_accepted(self) -> bool {
        self == BookingDecision::Accepted
    }
}

/// Result of [`ConflictGuard::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Booking),
    Rejected(RejectReason),
}

pub struct ConflictGuard<'a> {
    engine: &'a AvailabilityEngine<'a>,
}

impl<'a> ConflictGuard<'a> {
    pub fn new(engine: &'a AvailabilityEngine<'a>) -> Self {
        Self { engine }
    }

    /// Decide whether `claim` may be booked right now.
    ///
    /// Re-derives availability for `[window_start, window_end)` and accepts
    /// iff a window with exactly that start and end is offered. Empty or
    /// inverted windows are rejected.
    ///
    /// # Errors
    /// Returns `EngineError::RuleFetch` if the host's rules cannot be read.
    pub fn try_book(
        &self,
        claim: &BookingClaim,
        busy: Option<&dyn BusySource>,
    ) -> Result<BookingDecision> {
        let requested = claim.window();
        if requested.start >= requested.end {
            info!(
                host_id = %claim.host_id,
                window_start = %requested.start,
                window_end = %requested.end,
                "rejecting empty booking window"
            );
            return Ok(BookingDecision::Rejected(RejectReason::SlotUnavailable));
        }

        let availability = self.engine.compute_availability(
            &claim.host_id,
            requested.start,
            requested.end,
            busy,
        )?;

        let decision = if availability.offers(&requested) {
            BookingDecision::Accepted
        } else {
            BookingDecision::Rejected(RejectReason::SlotUnavailable)
        };

        info!(
            host_id = %claim.host_id,
            window_start = %requested.start,
            window_end = %requested.end,
            accepted = decision.is_accepted(),
            busy = availability.busy_status.label(),
            "booking claim evaluated"
        );

        Ok(decision)
    }

    /// Evaluate `claim` and, if accepted, persist it.
    ///
    /// Busy time is the host's active bookings in `store` plus `external` (their
    /// connected calendar, if any). Acceptance is followed by the store's atomic
    /// insert; losing that race is reported as `SlotUnavailable`.
    ///
    /// # Errors
    /// Returns `EngineError::RuleFetch` if rules cannot be read and
    /// `EngineError::Store` if the insert itself fails.
    pub fn commit(
        &self,
        claim: &BookingClaim,
        store: &dyn BookingStore,
        external: Option<&dyn BusySource>,
        status: BookingStatus,
    ) -> Result<BookingOutcome> {
        let busy = BookedBusySource::new(store, external);

        match self.try_book(claim, Some(&busy))? {
            BookingDecision::Rejected(reason) => Ok(BookingOutcome::Rejected(reason)),
            BookingDecision::Accepted => {
                let booking = Booking::from_claim(claim, status, Utc::now());
                match store
                    .insert_unless_booked(booking.clone())
                    .map_err(EngineError::Store)?
                {
                    InsertOutcome::Inserted(_) => Ok(BookingOutcome::Booked(booking)),
                    InsertOutcome::AlreadyBooked => {
                        info!(
                            host_id = %claim.host_id,
                            window_start = %claim.window_start,
                            "booking lost insert race"
                        );
                        Ok(BookingOutcome::Rejected(RejectReason::SlotUnavailable))
                    }
                }
            }
        }
    }
}
