//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Operations that guard an
//! invariant under concurrency (slot counters, booking status, one-shot
//! flags) are single conditional statements and report whether the
//! condition held instead of failing.

use uuid::Uuid;

use crate::error::ScreeningResult;
use crate::models::{
    admin::{Admin, CreateAdmin},
    booking::{Booking, BookingStatus, CreateBooking},
    event::{CreateEvent, Event, EventDetails, EventFilter},
    otp::{CreateOtpCode, OtpCode, OtpPurpose},
    participant::{CreateParticipant, Participant},
    result::{CreateMedicalResult, MedicalResult},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait AdminRepository: Send + Sync {
    fn create(&self, input: CreateAdmin) -> impl Future<Output = ScreeningResult<Admin>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ScreeningResult<Admin>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = ScreeningResult<Admin>> + Send;
}

pub trait ParticipantRepository: Send + Sync {
    fn create(
        &self,
        input: CreateParticipant,
    ) -> impl Future<Output = ScreeningResult<Participant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ScreeningResult<Participant>> + Send;
    fn get_by_phone(
        &self,
        phone_number: &str,
    ) -> impl Future<Output = ScreeningResult<Participant>> + Send;
    fn get_by_national_id(
        &self,
        national_id: &str,
    ) -> impl Future<Output = ScreeningResult<Participant>> + Send;
    /// Deletes the participant only while its phone is unverified.
    /// Returns `false` when the row is gone or already verified.
    fn discard_pending(&self, id: Uuid) -> impl Future<Output = ScreeningResult<bool>> + Send;
    fn mark_phone_verified(
        &self,
        id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Participant>> + Send;
}

pub trait OtpRepository: Send + Sync {
    fn create(&self, input: CreateOtpCode) -> impl Future<Output = ScreeningResult<OtpCode>> + Send;
    /// Most recent unconsumed code for the phone and purpose.
    fn get_latest_active(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> impl Future<Output = ScreeningResult<OtpCode>> + Send;
    /// Marks every unconsumed code for the pair as consumed. Returns how
    /// many were invalidated.
    fn invalidate_all(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> impl Future<Output = ScreeningResult<u64>> + Send;
    /// Increments the attempt counter and returns the new value.
    fn record_attempt(&self, id: Uuid) -> impl Future<Output = ScreeningResult<u32>> + Send;
    /// Consumes the code if it is still unconsumed. Returns `false` when
    /// another caller consumed it first.
    fn consume(&self, id: Uuid) -> impl Future<Output = ScreeningResult<bool>> + Send;
    /// Deletes expired codes. Returns the number removed.
    fn cleanup_expired(&self) -> impl Future<Output = ScreeningResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Events & capacity
// ---------------------------------------------------------------------------

pub trait EventRepository: Send + Sync {
    /// Creates the event with `available_slots == total_slots`.
    fn create(&self, input: CreateEvent) -> impl Future<Output = ScreeningResult<Event>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ScreeningResult<Event>> + Send;
    /// Finds an event with the same name, calendar day and address.
    fn find_by_dedup_key(
        &self,
        key: &str,
    ) -> impl Future<Output = ScreeningResult<Option<Event>>> + Send;
    fn update_details(
        &self,
        id: Uuid,
        details: EventDetails,
    ) -> impl Future<Output = ScreeningResult<Event>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = ScreeningResult<()>> + Send;
    /// Lists events ordered by `scheduled_at` ascending.
    fn list(
        &self,
        filter: EventFilter,
        pagination: Pagination,
    ) -> impl Future<Output = ScreeningResult<PaginatedResult<Event>>> + Send;

    /// Decrements `available_slots` iff it is positive. Returns the
    /// updated event, or `None` when the event was already full.
    fn try_reserve_slot(
        &self,
        id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Option<Event>>> + Send;
    /// Increments `available_slots` iff it is below `total_slots`.
    /// Returns the event after the (possibly skipped) increment.
    fn release_slot(&self, id: Uuid) -> impl Future<Output = ScreeningResult<Event>> + Send;
    /// Sets `total_slots` and shifts `available_slots` by the same delta,
    /// iff the new total still covers the booked slots. Returns `None`
    /// when it does not.
    fn resize(
        &self,
        id: Uuid,
        new_total: u32,
    ) -> impl Future<Output = ScreeningResult<Option<Event>>> + Send;
}

// ---------------------------------------------------------------------------
// Bookings & results
// ---------------------------------------------------------------------------

pub trait BookingRepository: Send + Sync {
    fn create(&self, input: CreateBooking) -> impl Future<Output = ScreeningResult<Booking>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ScreeningResult<Booking>> + Send;
    /// The participant's non-cancelled booking for the event, if any.
    fn find_active(
        &self,
        participant_id: Uuid,
        event_id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Option<Booking>>> + Send;
    /// Newest first.
    fn list_by_participant(
        &self,
        participant_id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Vec<Booking>>> + Send;
    /// Oldest first.
    fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Vec<Booking>>> + Send;
    fn count_by_event(&self, event_id: Uuid) -> impl Future<Output = ScreeningResult<u64>> + Send;
    /// Moves the booking from `from` to `to` iff its current status is
    /// still `from`. Moving to `cancelled` also stamps `cancelled_at`.
    /// Returns `None` when the status had already changed.
    fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> impl Future<Output = ScreeningResult<Option<Booking>>> + Send;
}

pub trait ResultRepository: Send + Sync {
    /// Fails with `Duplicate` if the booking already has a result.
    fn create(
        &self,
        input: CreateMedicalResult,
    ) -> impl Future<Output = ScreeningResult<MedicalResult>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ScreeningResult<MedicalResult>> + Send;
    fn find_by_booking(
        &self,
        booking_id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Option<MedicalResult>>> + Send;
    /// Newest first.
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = ScreeningResult<PaginatedResult<MedicalResult>>> + Send;
    /// Sets `sms_sent` and `sms_sent_at` iff not yet sent. Returns `None`
    /// when the flag was already set.
    fn mark_sms_sent(
        &self,
        id: Uuid,
    ) -> impl Future<Output = ScreeningResult<Option<MedicalResult>>> + Send;
    /// Clears `sms_sent` and `sms_sent_at` after a failed delivery.
    fn clear_sms_sent(&self, id: Uuid) -> impl Future<Output = ScreeningResult<()>> + Send;
}
