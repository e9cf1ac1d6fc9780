//! iCalendar invite for an accepted booking.

use icalendar::{Calendar, Component, EventLike, Property};
use slot_engine::booking::{Booking, BookingStatus};

/// Who sends the invite. A `REQUEST` without one is not treated as an invite
/// by mail clients.
#[derive(Debug, Clone)]
pub struct Organizer {
    pub name: String,
    pub email: String,
}

/// Render `booking` as a single-event `.ics` request from `organizer`.
pub fn generate_ics(booking: &Booking, organizer: &Organizer) -> String {
    let mut cal = Calendar::new();
    cal.append_property(Property::new("METHOD", "REQUEST"));

    let mut event = icalendar::Event::new();
    event.uid(&booking.id.to_string());
    event.summary(&format!("Meeting with {}", booking.host_id));
    event.starts(booking.window_start);
    event.ends(booking.window_end);

    if let Some(ref note) = booking.note {
        event.description(note);
    }

    let mut org = Property::new("ORGANIZER", format!("mailto:{}", organizer.email));
    org.add_parameter("CN", &organizer.name);
    event.append_property(org);

    if booking.booker_contact.contains('@') {
        let mut attendee = Property::new("ATTENDEE", format!("mailto:{}", booking.booker_contact));
        attendee.add_parameter("RSVP", "TRUE");
        event.append_property(attendee);
    }

    let status = match booking.status {
        BookingStatus::Pending => "TENTATIVE",
        BookingStatus::Confirmed | BookingStatus::Rescheduled => "CONFIRMED",
        BookingStatus::Cancelled => "CANCELLED",
    };
    event.add_property("STATUS", status);

    let event = event.done();
    cal.push(event);
    let cal = cal.done();

    cal.to_string()
}
