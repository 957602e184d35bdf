//! Booking endpoints for participants and admins.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use screenbook_booking::{
    AdminBookingEntry, BookingOutcome, BookingWithEvent, CancellationOutcome, NotificationStatus,
};
use screenbook_core::models::booking::Booking;
use screenbook_core::models::event::Event;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub event_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
}

impl From<Event> for EventSummary {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            name: e.name,
            scheduled_at: e.scheduled_at,
            address: e.address,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub waitlisted: bool,
    pub event: EventSummary,
}

impl From<BookingWithEvent> for BookingResponse {
    fn from(b: BookingWithEvent) -> Self {
        Self {
            waitlisted: b.booking.is_waitlisted(),
            booking: b.booking,
            event: b.event.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    pub message: &'static str,
    pub booking: BookingResponse,
    pub available_slots: u32,
    pub notification: NotificationStatus,
}

impl From<BookingOutcome> for BookingCreatedResponse {
    fn from(o: BookingOutcome) -> Self {
        Self {
            message: o.message(),
            available_slots: o.event.available_slots,
            booking: BookingWithEvent {
                booking: o.booking,
                event: o.event,
            }
            .into(),
            notification: o.notification,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancellationResponse {
    pub message: &'static str,
    pub booking: Booking,
    pub slot_released: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_release_error: Option<String>,
    pub notification: NotificationStatus,
}

impl From<CancellationOutcome> for CancellationResponse {
    fn from(o: CancellationOutcome) -> Self {
        Self {
            message: o.message(),
            booking: o.booking,
            slot_released: o.slot_released,
            slot_release_error: o.slot_release_error,
            notification: o.notification,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct AdminBookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub waitlisted: bool,
    pub event: EventSummary,
    pub participant: ParticipantSummary,
}

impl From<AdminBookingEntry> for AdminBookingResponse {
    fn from(e: AdminBookingEntry) -> Self {
        Self {
            waitlisted: e.booking.is_waitlisted(),
            booking: e.booking,
            event: e.event.into(),
            participant: ParticipantSummary {
                id: e.participant.id,
                name: e.participant.name,
                phone_number: e.participant.phone_number,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingList<T> {
    pub bookings: Vec<T>,
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

pub async fn participant_bookings(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> Result<Json<BookingList<BookingResponse>>, ApiError> {
    let bookings = state.bookings.participant_bookings(&ctx).await?;
    Ok(Json(BookingList {
        bookings: bookings.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), ApiError> {
    let outcome = state.bookings.create_booking(&ctx, req.event_id).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

pub async fn participant_cancel(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationResponse>, ApiError> {
    ctx.require_participant()?;
    let outcome = state.bookings.cancel_booking(&ctx, id).await?;
    Ok(Json(outcome.into()))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

pub async fn admin_bookings(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> Result<Json<BookingList<AdminBookingResponse>>, ApiError> {
    let bookings = state.bookings.admin_bookings(&ctx).await?;
    Ok(Json(BookingList {
        bookings: bookings.into_iter().map(Into::into).collect(),
    }))
}

pub async fn check_in(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.bookings.check_in(&ctx, id).await?))
}

pub async fn admin_cancel(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationResponse>, ApiError> {
    ctx.require_admin()?;
    let outcome = state.bookings.cancel_booking(&ctx, id).await?;
    Ok(Json(outcome.into()))
}
