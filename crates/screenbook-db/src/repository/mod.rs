//! SurrealDB repository implementations.

mod admin;
mod booking;
mod event;
mod otp;
mod participant;
mod result;

pub use admin::{SurrealAdminRepository, verify_password};
pub use booking::SurrealBookingRepository;
pub use event::SurrealEventRepository;
pub use otp::SurrealOtpRepository;
pub use participant::SurrealParticipantRepository;
pub use result::SurrealResultRepository;

use surrealdb_types::SurrealValue;

/// Row shape of `SELECT count() AS total ... GROUP ALL`.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}
