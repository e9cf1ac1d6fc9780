//! The JSON file the CLI reads hosts, calendars, and bookings from.
//!
//! ```json
//! {
//!   "config": { "dstPolicy": "shiftForward", "fallbackTimezone": "UTC" },
//!   "hosts": {
//!     "did:plc:alice": {
//!       "rules": [ { "duration": 30, "timeSlots": [ ... ] } ],
//!       "calendar": { "busy": [ { "start": "...", "end": "..." } ] }
//!     }
//!   },
//!   "bookings": []
//! }
//! ```
//!
//! A calendar with `"unavailable": "reason"` simulates a provider outage.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::booking::Booking;
use slot_engine::config::EngineConfig;
use slot_engine::error::SourceError;
use slot_engine::rule::AvailabilityRule;
use slot_engine::source::{BusySource, InMemoryRuleSource};
use slot_engine::window::BusyInterval;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostFixture>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HostFixture {
    pub rules: Vec<AvailabilityRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarFixture>,
}

/// A host's connected calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarFixture {
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

impl BusySource for CalendarFixture {
    fn fetch_busy(
        &self,
        _host_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, SourceError> {
        if let Some(reason) = &self.unavailable {
            return Err(SourceError::Unavailable(reason.clone()));
        }
        Ok(self
            .busy
            .iter()
            .filter(|b| b.start < end && start < b.end)
            .copied()
            .collect())
    }
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize fixture")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write fixture: {}", path.display()))
    }

    pub fn rule_source(&self) -> InMemoryRuleSource {
        let mut source = InMemoryRuleSource::new();
        for (host_id, host) in &self.hosts {
            source.insert(host_id, host.rules.clone());
        }
        source
    }

    pub fn calendar(&self, host_id: &str) -> Option<&CalendarFixture> {
        self.hosts.get(host_id).and_then(|h| h.calendar.as_ref())
    }

    pub fn rules(&self, host_id: &str) -> &[AvailabilityRule] {
        self.hosts
            .get(host_id)
            .map(|h| h.rules.as_slice())
            .unwrap_or_default()
    }
}
