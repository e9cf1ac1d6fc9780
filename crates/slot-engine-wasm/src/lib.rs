//! WASM bindings for slot-engine.
//!
//! Exposes slot generation, availability computation, and the booking check to
//! JavaScript via `wasm-bindgen`. All complex types cross the boundary as JSON
//! strings. The bindings are stateless: the caller passes the host's rules and
//! busy intervals on every call, so a JS worker can fetch them from wherever
//! it keeps them.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```
//!
//! The `*_json` functions hold the logic and report errors as plain strings so
//! they can be exercised natively; the `#[wasm_bindgen]` exports wrap them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::availability::{Availability, AvailabilityEngine};
use slot_engine::booking::BookingClaim;
use slot_engine::config::EngineConfig;
use slot_engine::conflict::ConflictGuard;
use slot_engine::error::SourceError;
use slot_engine::rule::AvailabilityRule;
use slot_engine::source::{BusySource, RuleSource};
use slot_engine::window::{BusyInterval, TimeWindow};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WindowDto {
    start: String,
    end: String,
}

impl From<&TimeWindow> for WindowDto {
    fn from(w: &TimeWindow) -> Self {
        Self {
            start: w.start.to_rfc3339(),
            end: w.end.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityDto {
    slots: Vec<WindowDto>,
    /// `filtered`, `not_configured`, or `unavailable`.
    busy: &'static str,
    degraded: bool,
}

impl From<&Availability> for AvailabilityDto {
    fn from(a: &Availability) -> Self {
        Self {
            slots: a.windows.iter().map(WindowDto::from).collect(),
            busy: a.busy_status.label(),
            degraded: a.is_degraded(),
        }
    }
}

#[derive(Serialize)]
struct DecisionDto {
    accepted: bool,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// Input format for windows passed from JavaScript.
#[derive(Deserialize)]
struct WindowInput {
    start: String,
    end: String,
}

/// Busy input: either a list of intervals, or `{"unavailable": "reason"}` when
/// the caller's calendar fetch failed.
#[derive(Deserialize)]
#[serde(untagged)]
enum BusyInput {
    Intervals(Vec<WindowInput>),
    Unavailable { unavailable: String },
}

// ---------------------------------------------------------------------------
// Collaborators backed by call arguments
// ---------------------------------------------------------------------------

/// The same rules for whichever host is asked about.
struct ProvidedRules(Vec<AvailabilityRule>);

impl RuleSource for ProvidedRules {
    fn fetch_rules(&self, _host_id: &str) -> Result<Vec<AvailabilityRule>, SourceError> {
        Ok(self.0.clone())
    }
}

struct ProvidedBusy(Result<Vec<BusyInterval>, SourceError>);

impl BusySource for ProvidedBusy {
    fn fetch_busy(
        &self,
        _host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, SourceError> {
        self.0.clone().map(|busy| {
            busy.into_iter()
                .filter(|b| b.start < end && start < b.end)
                .collect()
        })
    }
}

// Bindings are host-agnostic; the engine still wants a host id for logging.
const HOST: &str = "wasm";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts both RFC 3339 (with timezone offset, e.g., "2026-02-17T14:00:00+00:00")
/// and naive local time (e.g., "2026-02-17T14:00:00"), which is interpreted as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_windows(inputs: Vec<WindowInput>) -> Result<Vec<TimeWindow>, String> {
    inputs
        .into_iter()
        .map(|input| {
            Ok(TimeWindow::new(
                parse_datetime(&input.start)?,
                parse_datetime(&input.end)?,
            ))
        })
        .collect()
}

fn parse_rules(json: &str) -> Result<ProvidedRules, String> {
    serde_json::from_str(json)
        .map(ProvidedRules)
        .map_err(|e| format!("Invalid rules JSON: {}", e))
}

fn parse_busy(json: Option<&str>) -> Result<Option<ProvidedBusy>, String> {
    let Some(json) = json else {
        return Ok(None);
    };
    let input: BusyInput =
        serde_json::from_str(json).map_err(|e| format!("Invalid busy JSON: {}", e))?;
    let busy = match input {
        BusyInput::Intervals(windows) => Ok(parse_windows(windows)?),
        BusyInput::Unavailable { unavailable } => Err(SourceError::Unavailable(unavailable)),
    };
    Ok(Some(ProvidedBusy(busy)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// JSON-in / JSON-out operations
// ---------------------------------------------------------------------------

/// Generated slots for `rules_json` in `[range_start, range_end)`, ignoring busy time.
pub fn generate_slots_json(
    rules_json: &str,
    range_start: &str,
    range_end: &str,
) -> Result<String, String> {
    let rules = parse_rules(rules_json)?;
    let start = parse_datetime(range_start)?;
    let end = parse_datetime(range_end)?;

    let slots = slot_engine::generate_slots(&rules.0, start, end, &EngineConfig::default())
        .map_err(|e| e.to_string())?;

    to_json(&slots.iter().map(WindowDto::from).collect::<Vec<_>>())
}

/// Offered slots: generated from `rules_json`, minus `busy_json` if given.
pub fn compute_availability_json(
    rules_json: &str,
    busy_json: Option<&str>,
    range_start: &str,
    range_end: &str,
) -> Result<String, String> {
    let rules = parse_rules(rules_json)?;
    let busy = parse_busy(busy_json)?;
    let start = parse_datetime(range_start)?;
    let end = parse_datetime(range_end)?;

    let engine = AvailabilityEngine::new(&rules, EngineConfig::default());
    let availability = engine
        .compute_availability(HOST, start, end, busy.as_ref().map(|b| b as &dyn BusySource))
        .map_err(|e| e.to_string())?;

    to_json(&AvailabilityDto::from(&availability))
}

/// Whether `[window_start, window_end)` may be booked right now.
pub fn try_book_json(
    rules_json: &str,
    busy_json: Option<&str>,
    window_start: &str,
    window_end: &str,
) -> Result<String, String> {
    let rules = parse_rules(rules_json)?;
    let busy = parse_busy(busy_json)?;
    let claim = BookingClaim {
        host_id: HOST.to_string(),
        window_start: parse_datetime(window_start)?,
        window_end: parse_datetime(window_end)?,
        booker_contact: String::new(),
        note: None,
    };

    let engine = AvailabilityEngine::new(&rules, EngineConfig::default());
    let guard = ConflictGuard::new(&engine);
    let decision = guard
        .try_book(&claim, busy.as_ref().map(|b| b as &dyn BusySource))
        .map_err(|e| e.to_string())?;

    let dto = if decision.is_accepted() {
        DecisionDto {
            accepted: true,
            status: 201,
            error: None,
        }
    } else {
        DecisionDto {
            accepted: false,
            status: 409,
            error: Some("Slot no longer available"),
        }
    };
    to_json(&dto)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand availability rules into candidate slots.
///
/// `rules_json` is a JSON array of availability rule records. Returns a JSON
/// array of `{start, end}` objects with RFC 3339 datetime strings.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(rules_json: &str, range_start: &str, range_end: &str) -> Result<String, JsValue> {
    generate_slots_json(rules_json, range_start, range_end).map_err(|e| JsValue::from_str(&e))
}

/// Compute offered slots.
///
/// `busy_json` is either a JSON array of `{start, end}` objects, an object
/// `{"unavailable": "reason"}` when the calendar could not be read, or
/// `undefined` when the host has no calendar connected. Returns
/// `{slots, busy, degraded}`.
#[wasm_bindgen(js_name = "computeAvailability")]
pub fn compute_availability(
    rules_json: &str,
    busy_json: Option<String>,
    range_start: &str,
    range_end: &str,
) -> Result<String, JsValue> {
    compute_availability_json(rules_json, busy_json.as_deref(), range_start, range_end)
        .map_err(|e| JsValue::from_str(&e))
}

/// Re-check a booking request against current rules and busy time.
///
/// Returns `{accepted: true, status: 201}` or
/// `{accepted: false, status: 409, error}`.
#[wasm_bindgen(js_name = "tryBook")]
pub fn try_book(
    rules_json: &str,
    busy_json: Option<String>,
    window_start: &str,
    window_end: &str,
) -> Result<String, JsValue> {
    try_book_json(rules_json, busy_json.as_deref(), window_start, window_end)
        .map_err(|e| JsValue::from_str(&e))
}
