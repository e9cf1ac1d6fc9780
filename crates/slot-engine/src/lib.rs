//! # slot-engine
//!
//! Bookable time slots from recurring availability rules, and a booking guard
//! that never accepts a slot on stale information.
//!
//! A host publishes weekly rules ("Mon–Fri 09:00–17:00 Europe/Berlin, 30
//! minute slots, 5 minutes buffer after"). The engine expands those rules over
//! a query range, removes slots that collide with the host's busy time, and
//! returns what is left. When someone books one of those slots, the guard
//! recomputes availability for exactly that slot before accepting.
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` ↔ minutes, half-open overlap
//! - [`rule`] — Availability rule records
//! - [`window`] — Absolute `[start, end)` windows
//! - [`generator`] — Rules → candidate slots in a range
//! - [`dst`] — DST gap/overlap policies for rule boundaries
//! - [`busy`] — Drop candidates that collide with busy time
//! - [`availability`] — The read path (rules → slots → busy filter)
//! - [`conflict`] — The write path (re-derive, then accept or reject)
//! - [`source`] — Collaborator traits and in-memory implementations
//! - [`booking`] — Booking claims and records
//! - [`config`] — Explicit engine configuration
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod busy;
pub mod config;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod generator;
pub mod rule;
pub mod source;
pub mod time;
pub mod window;

pub use availability::{Availability, AvailabilityEngine, BusyStatus};
pub use booking::{Booking, BookingClaim, BookingStatus};
pub use busy::filter_busy;
pub use config::EngineConfig;
pub use conflict::{BookingDecision, BookingOutcome, ConflictGuard, RejectReason};
pub use error::{EngineError, SourceError};
pub use generator::generate_slots;
pub use rule::{AvailabilityRule, TimeSlotRule};
pub use source::{BookingStore, BusySource, RuleSource};
pub use window::{BusyInterval, TimeWindow};
