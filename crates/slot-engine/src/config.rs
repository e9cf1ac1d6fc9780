//! Engine configuration, passed explicitly into every computation.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// How to place span boundaries that fall in a DST gap.
    pub dst_policy: DstPolicy,
    /// Zone for time-slot rules that leave `timezone` empty.
    pub fallback_timezone: Tz,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dst_policy: DstPolicy::default(),
            fallback_timezone: Tz::UTC,
        }
    }
}
