//! Booking lifecycle controller.
//!
//! ```text
//! confirmed ──► checked_in ──► completed
//!     │              │
//!     └──► cancelled ◄┘
//! ```
//!
//! A booking made while its event is full is still `confirmed` but does
//! not hold a slot (`holds_slot == false`); it is reported as waitlisted.
//! There is no queue and no automatic promotion.

use screenbook_core::context::AuthContext;
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::SmsSender;
use screenbook_core::models::booking::{Booking, BookingStatus, CreateBooking};
use screenbook_core::models::event::{Event, EventFilter};
use screenbook_core::models::participant::Participant;
use screenbook_core::repository::{
    BookingRepository, EventRepository, Pagination, ParticipantRepository,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::capacity::{CapacityManager, Reservation};
use crate::notify::{NotificationStatus, notify};
use crate::reference::generate_reference;

/// Attempts at drawing an unused booking reference.
const REFERENCE_ATTEMPTS: usize = 5;

/// Result of [`BookingService::create_booking`].
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub booking: Booking,
    pub event: Event,
    pub notification: NotificationStatus,
}

impl BookingOutcome {
    pub fn is_waitlisted(&self) -> bool {
        self.booking.is_waitlisted()
    }

    pub fn message(&self) -> &'static str {
        match (self.is_waitlisted(), self.notification.is_sent()) {
            (false, true) => "Booking confirmed. A confirmation SMS has been sent.",
            (false, false) => "Booking confirmed, but the confirmation SMS could not be sent.",
            (true, true) => "The event is full. You have been placed on the waitlist and notified by SMS.",
            (true, false) => {
                "The event is full. You have been placed on the waitlist, but the SMS could not be sent."
            }
        }
    }
}

/// Result of [`BookingService::cancel_booking`].
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking: Booking,
    /// Whether a slot went back to the event.
    pub slot_released: bool,
    /// Set when the booking held a slot but returning it failed.
    pub slot_release_error: Option<String>,
    pub notification: NotificationStatus,
}

impl CancellationOutcome {
    pub fn message(&self) -> &'static str {
        if self.notification.is_sent() {
            "Booking cancelled. A cancellation SMS has been sent."
        } else {
            "Booking cancelled, but the cancellation SMS could not be sent."
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingWithEvent {
    pub booking: Booking,
    pub event: Event,
}

#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub booking: Booking,
    pub participant: Participant,
}

#[derive(Debug, Clone)]
pub struct AdminBookingEntry {
    pub booking: Booking,
    pub event: Event,
    pub participant: Participant,
}

fn invalid_transition(from: BookingStatus, to: BookingStatus) -> ScreeningError {
    ScreeningError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Checks a status change against the booking lifecycle.
pub(crate) fn ensure_transition(from: BookingStatus, to: BookingStatus) -> ScreeningResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(invalid_transition(from, to))
    }
}

pub struct BookingService<E, B, P, S>
where
    E: EventRepository,
    B: BookingRepository,
    P: ParticipantRepository,
    S: SmsSender,
{
    capacity: CapacityManager<E>,
    bookings: B,
    participants: P,
    sms: S,
}

impl<E, B, P, S> BookingService<E, B, P, S>
where
    E: EventRepository,
    B: BookingRepository,
    P: ParticipantRepository,
    S: SmsSender,
{
    pub fn new(capacity: CapacityManager<E>, bookings: B, participants: P, sms: S) -> Self {
        Self {
            capacity,
            bookings,
            participants,
            sms,
        }
    }

    /// Books the calling participant onto an event.
    ///
    /// The duplicate check, the reservation and the insert run under the
    /// event's lock. The confirmation SMS is sent after the lock is
    /// released and its failure does not undo the booking.
    pub async fn create_booking(
        &self,
        ctx: &AuthContext,
        event_id: Uuid,
    ) -> ScreeningResult<BookingOutcome> {
        let participant_id = ctx.require_participant()?;
        let participant = self.participants.get_by_id(participant_id).await?;
        if !participant.phone_verified {
            return Err(ScreeningError::forbidden("phone number is not verified"));
        }

        let (booking, event) = {
            let _guard = self.capacity.lock_event(event_id).await;

            // 1. One live booking per participant and event.
            if self
                .bookings
                .find_active(participant_id, event_id)
                .await?
                .is_some()
            {
                return Err(ScreeningError::Conflict {
                    reason: "participant already has a booking for this event".into(),
                });
            }

            // 2. Reserve; a full event waitlists instead of failing.
            let (reservation, event) = self.capacity.reserve_slot(event_id, ctx).await?;
            let holds_slot = reservation == Reservation::Confirmed;

            // 3. Persist, giving the slot back if that fails.
            match self.insert_booking(participant_id, event_id, holds_slot).await {
                Ok(booking) => (booking, event),
                Err(e) => {
                    if holds_slot {
                        self.capacity.release_slot(event_id).await?;
                    }
                    return Err(e);
                }
            }
        };

        info!(
            booking_id = %booking.id,
            reference = %booking.reference,
            %event_id,
            waitlisted = booking.is_waitlisted(),
            "Booking created"
        );

        let body = if booking.holds_slot {
            format!(
                "Booking confirmed for {} on {} at {}.\nRef: {}.",
                event.name,
                event.scheduled_at.format("%Y-%m-%d"),
                event.scheduled_at.format("%H:%M"),
                booking.reference
            )
        } else {
            format!(
                "{} on {} is full. You are on the waitlist.\nRef: {}.",
                event.name,
                event.scheduled_at.format("%Y-%m-%d"),
                booking.reference
            )
        };
        let notification = notify(&self.sms, &participant.phone_number, &body).await;

        Ok(BookingOutcome {
            booking,
            event,
            notification,
        })
    }

    async fn insert_booking(
        &self,
        participant_id: Uuid,
        event_id: Uuid,
        holds_slot: bool,
    ) -> ScreeningResult<Booking> {
        let mut last_err = None;
        for _ in 0..REFERENCE_ATTEMPTS {
            let input = CreateBooking {
                reference: generate_reference(),
                participant_id,
                event_id,
                holds_slot,
            };
            match self.bookings.create(input).await {
                Ok(booking) => return Ok(booking),
                Err(e @ ScreeningError::Duplicate { .. }) => {
                    warn!("Booking reference collision, retrying");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ScreeningError::Internal("could not allocate a booking reference".into())
        }))
    }

    /// Cancels a booking. Participants may cancel only their own; admins
    /// may cancel any.
    ///
    /// The slot goes back to the event only when the booking was still
    /// `confirmed` and actually held one.
    pub async fn cancel_booking(
        &self,
        ctx: &AuthContext,
        booking_id: Uuid,
    ) -> ScreeningResult<CancellationOutcome> {
        let booking = self.bookings.get_by_id(booking_id).await?;
        if !ctx.is_admin() && booking.participant_id != ctx.user_id {
            return Err(ScreeningError::forbidden("booking belongs to another participant"));
        }

        // Statuses only move forward, so a lost race re-checks at most a
        // few times.
        let mut current = booking.clone();
        let (prior, cancelled) = loop {
            let prior = current.status;
            if prior == BookingStatus::Cancelled {
                return Err(ScreeningError::AlreadyCancelled {
                    reference: current.reference,
                });
            }
            ensure_transition(prior, BookingStatus::Cancelled)?;

            match self
                .bookings
                .transition(booking_id, prior, BookingStatus::Cancelled)
                .await?
            {
                Some(cancelled) => break (prior, cancelled),
                None => current = self.bookings.get_by_id(booking_id).await?,
            }
        };

        // The cancellation is committed; a failed release is reported on
        // the outcome rather than raised.
        let mut slot_released = false;
        let mut slot_release_error = None;
        if prior == BookingStatus::Confirmed && booking.holds_slot {
            match self.capacity.release_slot(booking.event_id).await {
                Ok(_) => slot_released = true,
                Err(e) => {
                    error!(
                        booking_id = %booking_id,
                        event_id = %booking.event_id,
                        error = %e,
                        "Slot release failed after cancellation"
                    );
                    slot_release_error = Some(e.to_string());
                }
            }
        }

        info!(
            booking_id = %booking_id,
            reference = %cancelled.reference,
            cancelled_by = %ctx.role,
            slot_released,
            "Booking cancelled"
        );

        let notification = match self.participants.get_by_id(booking.participant_id).await {
            Ok(participant) => {
                let body = format!(
                    "Your booking with reference {} has been cancelled. \
                     If this wasn't you, please contact support immediately.",
                    cancelled.reference
                );
                notify(&self.sms, &participant.phone_number, &body).await
            }
            Err(e) => NotificationStatus::Failed {
                reason: e.to_string(),
            },
        };

        Ok(CancellationOutcome {
            booking: cancelled,
            slot_released,
            slot_release_error,
            notification,
        })
    }

    /// Marks a confirmed booking as attended.
    pub async fn check_in(&self, ctx: &AuthContext, booking_id: Uuid) -> ScreeningResult<Booking> {
        ctx.require_admin()?;

        let booking = self.bookings.get_by_id(booking_id).await?;
        ensure_transition(booking.status, BookingStatus::CheckedIn)?;

        let checked_in = self
            .bookings
            .transition(booking_id, booking.status, BookingStatus::CheckedIn)
            .await?;
        match checked_in {
            Some(b) => {
                info!(booking_id = %booking_id, admin_id = %ctx.user_id, "Participant checked in");
                Ok(b)
            }
            None => {
                let current = self.bookings.get_by_id(booking_id).await?;
                Err(invalid_transition(current.status, BookingStatus::CheckedIn))
            }
        }
    }

    /// The calling participant's bookings, newest first.
    pub async fn participant_bookings(
        &self,
        ctx: &AuthContext,
    ) -> ScreeningResult<Vec<BookingWithEvent>> {
        let participant_id = ctx.require_participant()?;
        let bookings = self.bookings.list_by_participant(participant_id).await?;

        let mut entries = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let event = self.capacity.events().get_by_id(booking.event_id).await?;
            entries.push(BookingWithEvent { booking, event });
        }
        Ok(entries)
    }

    /// Bookings on every event the calling admin created, newest first.
    pub async fn admin_bookings(&self, ctx: &AuthContext) -> ScreeningResult<Vec<AdminBookingEntry>> {
        let admin_id = ctx.require_admin()?;
        let events = self
            .capacity
            .events()
            .list(
                EventFilter {
                    created_by: Some(admin_id),
                    ..Default::default()
                },
                Pagination {
                    offset: 0,
                    limit: u64::from(u32::MAX),
                },
            )
            .await?;

        let mut entries = Vec::new();
        for event in events.items {
            for booking in self.bookings.list_by_event(event.id).await? {
                let participant = self.participants.get_by_id(booking.participant_id).await?;
                entries.push(AdminBookingEntry {
                    booking,
                    event: event.clone(),
                    participant,
                });
            }
        }
        entries.sort_by(|a, b| b.booking.booked_at.cmp(&a.booking.booked_at));
        Ok(entries)
    }

    /// Everyone booked on an event, in booking order.
    pub async fn event_roster(
        &self,
        ctx: &AuthContext,
        event_id: Uuid,
    ) -> ScreeningResult<(Event, Vec<RosterEntry>)> {
        ctx.require_admin()?;
        let event = self.capacity.events().get_by_id(event_id).await?;

        let mut roster = Vec::new();
        for booking in self.bookings.list_by_event(event_id).await? {
            let participant = self.participants.get_by_id(booking.participant_id).await?;
            roster.push(RosterEntry {
                booking,
                participant,
            });
        }
        Ok((event, roster))
    }
}
