//! Screenbook Booking — event capacity, the booking lifecycle, the event
//! catalogue and the OTP-gated result flow.
//!
//! Every service takes an explicit [`AuthContext`] and is generic over
//! the repository and gateway traits in `screenbook-core`.
//!
//! [`AuthContext`]: screenbook_core::context::AuthContext

pub mod booking;
pub mod capacity;
pub mod catalogue;
pub mod export;
pub mod locks;
pub mod notify;
pub mod reference;
pub mod results;

pub use booking::{
    AdminBookingEntry, BookingOutcome, BookingService, BookingWithEvent, CancellationOutcome,
    RosterEntry,
};
pub use capacity::{CapacityManager, Reservation};
pub use catalogue::{EventCatalogue, EventInput};
pub use export::roster_csv;
pub use locks::EventLocks;
pub use notify::NotificationStatus;
pub use results::{
    AdminResultEntry, ParticipantResultEntry, ResultService, ResultView, UploadResult,
    UploadedFile,
};
