//! Error types for slot-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure reported by an external collaborator (rule storage, calendar
/// provider, booking store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("source timed out")]
    Timeout,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid time of day: {0}")]
    InvalidFormat(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Rule fetch failed: {0}")]
    RuleFetch(#[source] SourceError),

    #[error("Booking store failed: {0}")]
    Store(#[source] SourceError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
