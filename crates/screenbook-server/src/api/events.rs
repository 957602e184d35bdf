//! Event catalogue endpoints.
//!
//! - `GET /events`, `GET /events/:id` are public; drafts are only
//!   visible to admins.
//! - `POST`, `PUT`, `DELETE` require the admin who created the event.
//! - `GET /events/:id/participants[/export]` return the roster.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use screenbook_booking::{EventInput, RosterEntry, roster_csv};
use screenbook_core::models::booking::BookingStatus;
use screenbook_core::models::event::{Event, EventFilter, EventStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageQuery;
use crate::error::ApiError;
use crate::extract::{Caller, MaybeCaller};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    pub total_slots: u32,
    #[serde(default = "default_status")]
    pub status: EventStatus,
    pub additional_info: Option<String>,
}

fn default_status() -> EventStatus {
    EventStatus::Published
}

impl From<EventRequest> for EventInput {
    fn from(r: EventRequest) -> Self {
        Self {
            name: r.name,
            scheduled_at: r.scheduled_at,
            address: r.address,
            total_slots: r.total_slots,
            status: r.status,
            additional_info: r.additional_info,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<EventStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub booked_slots: u32,
    pub is_full: bool,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            booked_slots: event.booked_slots(),
            is_full: event.is_full(),
            event,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct RosterRow {
    pub booking_id: Uuid,
    pub reference: String,
    pub status: BookingStatus,
    pub waitlisted: bool,
    pub booked_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub participant_id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub national_id: String,
}

impl From<RosterEntry> for RosterRow {
    fn from(e: RosterEntry) -> Self {
        Self {
            booking_id: e.booking.id,
            waitlisted: e.booking.is_waitlisted(),
            reference: e.booking.reference,
            status: e.booking.status,
            booked_at: e.booking.booked_at,
            cancelled_at: e.booking.cancelled_at,
            participant_id: e.participant.id,
            name: e.participant.name,
            phone_number: e.participant.phone_number,
            national_id: e.participant.national_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub event: EventResponse,
    pub participants: Vec<RosterRow>,
}

pub async fn list_events(
    State(state): State<AppState>,
    MaybeCaller(ctx): MaybeCaller,
    Query(q): Query<ListEventsQuery>,
) -> Result<Json<EventListResponse>, ApiError> {
    let filter = EventFilter {
        status: q.status,
        date_from: q.date_from,
        date_to: q.date_to,
        location: q.location.filter(|l| !l.trim().is_empty()),
        created_by: None,
    };
    let page = PageQuery {
        offset: q.offset,
        limit: q.limit,
    };

    let result = state
        .catalogue
        .list_events(ctx.as_ref(), filter, page.into())
        .await?;
    Ok(Json(EventListResponse {
        events: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        offset: result.offset,
        limit: result.limit,
    }))
}

pub async fn get_event(
    State(state): State<AppState>,
    MaybeCaller(ctx): MaybeCaller,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.catalogue.get_event(ctx.as_ref(), id).await?;
    Ok(Json(event.into()))
}

pub async fn create_event(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(req): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let event = state.catalogue.create_event(&ctx, req.into()).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

pub async fn update_event(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<EventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.catalogue.update_event(&ctx, id, req.into()).await?;
    Ok(Json(event.into()))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalogue.delete_event(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn event_participants(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterResponse>, ApiError> {
    let (event, roster) = state.bookings.event_roster(&ctx, id).await?;
    Ok(Json(RosterResponse {
        event: event.into(),
        participants: roster.into_iter().map(Into::into).collect(),
    }))
}

pub async fn export_participants(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (event, roster) = state.bookings.event_roster(&ctx, id).await?;
    let csv = roster_csv(&roster)?;
    let disposition = format!("attachment; filename=\"participants_{}.csv\"", event.id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
