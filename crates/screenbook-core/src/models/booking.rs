//! Booking domain model and lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    CheckedIn,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// `confirmed → checked_in → completed`, and either of the first two
    /// may be cancelled. `cancelled` and `completed` are terminal.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Confirmed, Self::CheckedIn)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::CheckedIn, Self::Cancelled)
                | (Self::CheckedIn, Self::Completed)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-readable reference, e.g. `ROSE-7K2Q9D`.
    pub reference: String,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub status: BookingStatus,
    /// False for bookings made while the event was full.
    pub holds_slot: bool,
    pub booked_at: DateTime<Utc>,
    /// Set once on cancellation, never cleared.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn is_waitlisted(&self) -> bool {
        !self.holds_slot && self.status != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub reference: String,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub holds_slot: bool,
}
