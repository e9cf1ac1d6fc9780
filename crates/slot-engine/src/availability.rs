//! The read path: which slots does a host offer in a range right now?
//!
//! Fetches the host's rules, expands them into candidate slots, then removes
//! the slots that collide with busy time. Busy time is optional: a host with
//! no connected calendar gets every generated slot, and a busy source that
//! fails is treated as reporting nothing (fail open). The second case is
//! reported in [`BusyStatus`] and logged so it can be told apart from a
//! genuinely free calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::busy::filter_busy;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::generator::generate_slots;
use crate::source::{BusySource, RuleSource};
use crate::window::TimeWindow;

/// How busy time was applied to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BusyStatus {
    /// Busy time was fetched and `intervals` busy intervals were applied.
    Filtered { intervals: usize },
    /// No busy source is connected for the host.
    NotConfigured,
    /// The busy source failed; slots are unfiltered.
    Unavailable { reason: String },
}

impl BusyStatus {
    /// Short label for logs and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            BusyStatus::Filtered { .. } => "filtered",
            BusyStatus::NotConfigured => "not_configured",
            BusyStatus::Unavailable { .. } => "unavailable",
        }
    }
}

/// Offered slots for one host over one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// Offered windows, sorted by start. May contain duplicates when rules overlap.
    pub windows: Vec<TimeWindow>,
    pub busy_status: BusyStatus,
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
}

impl Availability {
    /// True when the result is unfiltered because busy time could not be read.
    pub fn is_degraded(&self) -> bool {
        matches!(self.busy_status, BusyStatus::Unavailable { .. })
    }

    /// Whether exactly `window` is among the offered windows.
    pub fn offers(&self, window: &TimeWindow) -> bool {
        self.windows.iter().any(|w| w == window)
    }
}

/// Computes availability against a rule source with a fixed configuration.
///
/// Holds no state between calls; identical inputs give identical output.
pub struct AvailabilityEngine<'a> {
    rules: &'a dyn RuleSource,
    config: EngineConfig,
}

impl<'a> AvailabilityEngine<'a> {
    pub fn new(rules: &'a dyn RuleSource, config: EngineConfig) -> Self {
        Self { rules, config }
    }

    /// Offered windows for `host_id` inside `[range_start, range_end)`.
    ///
    /// # Arguments
    ///
    /// * `busy` — The host's busy source, or `None` if no calendar is
    ///   connected. Fetch failures do not fail the call.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRange` if `range_start > range_end`, and
    /// `EngineError::RuleFetch` if the rule source fails.
    pub fn compute_availability(
        &self,
        host_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        busy: Option<&dyn BusySource>,
    ) -> Result<Availability> {
        if range_start > range_end {
            return Err(EngineError::InvalidRange {
                start: range_start,
                end: range_end,
            });
        }

        let rules = self
            .rules
            .fetch_rules(host_id)
            .map_err(EngineError::RuleFetch)?;

        let candidates = generate_slots(&rules, range_start, range_end, &self.config)?;

        let (windows, busy_status) = match busy {
            None => (candidates, BusyStatus::NotConfigured),
            Some(source) => match source.fetch_busy(host_id, range_start, range_end) {
                Ok(intervals) => {
                    let offered = filter_busy(&candidates, &intervals);
                    (
                        offered,
                        BusyStatus::Filtered {
                            intervals: intervals.len(),
                        },
                    )
                }
                Err(err) => {
                    warn!(
                        host_id,
                        %range_start,
                        %range_end,
                        error = %err,
                        "busy source unavailable; serving unfiltered availability"
                    );
                    (
                        candidates,
                        BusyStatus::Unavailable {
                            reason: err.to_string(),
                        },
                    )
                }
            },
        };

        debug!(
            host_id,
            offered = windows.len(),
            busy = busy_status.label(),
            "computed availability"
        );

        Ok(Availability {
            windows,
            busy_status,
            range_start,
            range_end,
        })
    }
}
