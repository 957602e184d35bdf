//! CSV export of an event roster.

use screenbook_core::error::{ScreeningError, ScreeningResult};

use crate::booking::RosterEntry;

const HEADER: [&str; 8] = [
    "Reference",
    "Name",
    "Phone",
    "National ID",
    "Status",
    "Waitlisted",
    "Booked At",
    "Cancelled At",
];

fn csv_error(e: impl std::fmt::Display) -> ScreeningError {
    ScreeningError::Internal(format!("csv export failed: {e}"))
}

/// Renders the roster as CSV, one row per booking in the given order.
pub fn roster_csv(entries: &[RosterEntry]) -> ScreeningResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).map_err(csv_error)?;

    for entry in entries {
        let booking = &entry.booking;
        let participant = &entry.participant;
        let booked_at = booking.booked_at.to_rfc3339();
        let cancelled_at = booking
            .cancelled_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        writer
            .write_record([
                booking.reference.as_str(),
                participant.name.as_str(),
                participant.phone_number.as_str(),
                participant.national_id.as_str(),
                booking.status.as_str(),
                if booking.is_waitlisted() { "yes" } else { "no" },
                booked_at.as_str(),
                cancelled_at.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}
