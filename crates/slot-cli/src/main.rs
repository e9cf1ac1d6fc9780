//! `slots` CLI — query bookable slots and book them against a JSON fixture.
//!
//! ## Usage
//!
//! ```sh
//! # Offered slots for a host on Monday morning
//! slots query -i calendar.json --host did:plc:alice \
//!   --start 2026-03-16T09:00:00Z --end 2026-03-16T12:00:00Z
//!
//! # Book one of them (the booking is written back into calendar.json)
//! slots book -i calendar.json --host did:plc:alice \
//!   --start 2026-03-16T09:30:00Z --end 2026-03-16T10:00:00Z \
//!   --contact guest@example.com --note "intro call" --ics invite.ics \
//!   --organizer-email alice@example.com --organizer-name Alice
//!
//! # Show a host's weekly rules
//! slots rules -i calendar.json --host did:plc:alice
//! ```
//!
//! `query` and `book` print one JSON object mirroring the HTTP surface:
//! `{"status": 200, "slots": [...]}`, `{"status": 201, "bookingId": ...}`, or
//! `{"status": 409, "error": ...}`. A 409 exits with code 3.
//!
//! Logs go to stderr; set `RUST_LOG` (default `warn`) to see more.

mod fixture;
mod invite;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use slot_engine::availability::AvailabilityEngine;
use slot_engine::booking::{BookingClaim, BookingStatus};
use slot_engine::busy::overlapping_busy;
use slot_engine::conflict::{BookingOutcome, ConflictGuard};
use slot_engine::rule::{AutoAccept, AvailabilityRule};
use slot_engine::source::{BookedBusySource, BusySource, InMemoryBookingStore};
use slot_engine::time::{day_name, minutes_to_time_of_day, time_of_day_to_minutes};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::fixture::Fixture;
use crate::invite::Organizer;

/// Exit code for a booking rejected with 409.
const CONFLICT_EXIT_CODE: i32 = 3;

#[derive(Parser)]
#[command(name = "slots", version, about = "Bookable slot queries and bookings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List offered slots for a host in a range
    Query {
        /// Fixture file with hosts, calendars, and bookings
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        host: String,
        /// Range start (RFC 3339, or naive UTC)
        #[arg(long)]
        start: String,
        /// Range end (RFC 3339, or naive UTC)
        #[arg(long)]
        end: String,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Book one exact slot, if it is still offered
    Book {
        /// Fixture file; accepted bookings are written back to it
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        host: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Booker's contact (email address)
        #[arg(long)]
        contact: String,
        #[arg(long)]
        note: Option<String>,
        /// Also write an iCalendar invite for the booking here
        #[arg(long)]
        ics: Option<PathBuf>,
        /// Organizer address on the invite
        #[arg(long, default_value = "noreply@atproto-cal.com")]
        organizer_email: String,
        /// Organizer display name on the invite
        #[arg(long, default_value = "Host")]
        organizer_name: String,
    },
    /// Print a host's weekly availability rules
    Rules {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        host: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            input,
            host,
            start,
            end,
            pretty,
        } => {
            let fixture = Fixture::load(&input)?;
            let start = parse_datetime(&start)?;
            let end = parse_datetime(&end)?;

            let rules = fixture.rule_source();
            let store = InMemoryBookingStore::from_bookings(fixture.bookings.clone());
            let calendar = fixture.calendar(&host).map(|c| c as &dyn BusySource);
            let busy = BookedBusySource::new(&store, calendar);

            let engine = AvailabilityEngine::new(&rules, fixture.config);
            let availability = engine
                .compute_availability(&host, start, end, Some(&busy))
                .context("Failed to compute availability")?;

            let body = json!({
                "status": 200,
                "slots": availability.windows,
                "busy": availability.busy_status.label(),
                "degraded": availability.is_degraded(),
            });
            let out = if pretty {
                serde_json::to_string_pretty(&body)?
            } else {
                serde_json::to_string(&body)?
            };
            println!("{}", out);
        }
        Commands::Book {
            input,
            host,
            start,
            end,
            contact,
            note,
            ics,
            organizer_email,
            organizer_name,
        } => {
            let mut fixture = Fixture::load(&input)?;
            let claim = BookingClaim {
                host_id: host.clone(),
                window_start: parse_datetime(&start)?,
                window_end: parse_datetime(&end)?,
                booker_contact: contact,
                note,
            };

            let rules = fixture.rule_source();
            let store = InMemoryBookingStore::from_bookings(std::mem::take(&mut fixture.bookings));
            let calendar = fixture.calendar(&host).map(|c| c as &dyn BusySource);
            let status = initial_status(fixture.rules(&host));

            let engine = AvailabilityEngine::new(&rules, fixture.config);
            let guard = ConflictGuard::new(&engine);
            let outcome = guard
                .commit(&claim, &store, calendar, status)
                .context("Failed to evaluate booking")?;

            match outcome {
                BookingOutcome::Booked(booking) => {
                    fixture.bookings = store.into_bookings();
                    fixture.save(&input)?;
                    info!(booking_id = %booking.id, fixture = %input.display(), "booking saved");

                    if let Some(path) = ics {
                        let organizer = Organizer {
                            name: organizer_name,
                            email: organizer_email,
                        };
                        std::fs::write(&path, invite::generate_ics(&booking, &organizer))
                            .with_context(|| format!("Failed to write invite: {}", path.display()))?;
                    }

                    println!(
                        "{}",
                        json!({
                            "status": 201,
                            "success": true,
                            "bookingId": booking.id,
                            "bookingStatus": booking.status,
                        })
                    );
                }
                BookingOutcome::Rejected(_) => {
                    // Best effort: an unreadable calendar just means no list.
                    let busy = BookedBusySource::new(&store, calendar)
                        .fetch_busy(&host, claim.window_start, claim.window_end)
                        .unwrap_or_default();
                    let conflicts = overlapping_busy(&claim.window(), &busy);
                    println!(
                        "{}",
                        json!({
                            "status": 409,
                            "error": "Slot no longer available",
                            "conflicts": conflicts,
                        })
                    );
                    process::exit(CONFLICT_EXIT_CODE);
                }
            }
        }
        Commands::Rules { input, host } => {
            let fixture = Fixture::load(&input)?;
            let rules = fixture.rules(&host);
            if rules.is_empty() {
                anyhow::bail!("No availability rules for host '{}'", host);
            }
            for rule in rules {
                print_rule(rule);
            }
        }
    }

    Ok(())
}

/// Bookings against hosts who accept everyone are confirmed straight away;
/// anything stricter waits for the host.
fn initial_status(rules: &[AvailabilityRule]) -> BookingStatus {
    if rules
        .iter()
        .all(|r| r.booking_rules.auto_accept == AutoAccept::All)
    {
        BookingStatus::Confirmed
    } else {
        BookingStatus::Pending
    }
}

fn print_rule(rule: &AvailabilityRule) {
    let title = if rule.title.is_empty() {
        &rule.id
    } else {
        &rule.title
    };
    println!(
        "{} ({} min, buffer {}/{} min)",
        title, rule.duration, rule.buffer_before, rule.buffer_after
    );
    for slot in &rule.time_slots {
        let day = day_name(slot.day_of_week).unwrap_or("invalid day");
        let span = match (
            time_of_day_to_minutes(&slot.start_time),
            time_of_day_to_minutes(&slot.end_time),
        ) {
            (Ok(s), Ok(e)) => format!(
                "{}-{} ({} min)",
                minutes_to_time_of_day(s),
                minutes_to_time_of_day(e),
                e.saturating_sub(s)
            ),
            _ => format!("{}-{} (invalid)", slot.start_time, slot.end_time),
        };
        let tz = if slot.timezone.is_empty() {
            "default zone"
        } else {
            slot.timezone.as_str()
        };
        println!("  {:<9} {} {}", day, span, tz);
    }
}

/// Parse an RFC 3339 datetime, or a naive `YYYY-MM-DDTHH:MM:SS` read as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .with_context(|| format!("Invalid datetime: '{}'", s))
}
