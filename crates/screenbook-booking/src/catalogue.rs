//! Event catalogue: admin management and public listing of events.

use chrono::{DateTime, Utc};
use screenbook_core::context::AuthContext;
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::models::event::{
    CreateEvent, Event, EventDetails, EventFilter, EventStatus, dedup_key,
};
use screenbook_core::repository::{BookingRepository, EventRepository, PaginatedResult, Pagination};
use tracing::info;
use uuid::Uuid;

use crate::capacity::CapacityManager;

/// Full description of an event as submitted by an admin, for both
/// creation and replacement.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    pub total_slots: u32,
    pub status: EventStatus,
    pub additional_info: Option<String>,
}

impl EventInput {
    /// Trims text fields and rejects blank ones, empty capacity and past
    /// dates.
    fn validated(self, now: DateTime<Utc>) -> ScreeningResult<Self> {
        let name = self.name.trim().to_string();
        let address = self.address.trim().to_string();
        if name.is_empty() {
            return Err(ScreeningError::validation("event name is required"));
        }
        if address.is_empty() {
            return Err(ScreeningError::validation("event address is required"));
        }
        if self.total_slots == 0 {
            return Err(ScreeningError::validation("total slots must be at least 1"));
        }
        if self.scheduled_at < now {
            return Err(ScreeningError::validation("event date cannot be in the past"));
        }
        let additional_info = self
            .additional_info
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            name,
            address,
            additional_info,
            ..self
        })
    }
}

fn duplicate_event() -> ScreeningError {
    ScreeningError::Conflict {
        reason: "an event with the same name, date and address already exists".into(),
    }
}

pub struct EventCatalogue<E: EventRepository, B: BookingRepository> {
    capacity: CapacityManager<E>,
    bookings: B,
}

impl<E: EventRepository, B: BookingRepository> EventCatalogue<E, B> {
    pub fn new(capacity: CapacityManager<E>, bookings: B) -> Self {
        Self { capacity, bookings }
    }

    fn events(&self) -> &E {
        self.capacity.events()
    }

    /// Fetches an event the calling admin created.
    async fn owned_event(&self, ctx: &AuthContext, event_id: Uuid) -> ScreeningResult<Event> {
        let admin_id = ctx.require_admin()?;
        let event = self.events().get_by_id(event_id).await?;
        if event.created_by != admin_id {
            return Err(ScreeningError::forbidden("only the creating admin may change this event"));
        }
        Ok(event)
    }

    pub async fn create_event(&self, ctx: &AuthContext, input: EventInput) -> ScreeningResult<Event> {
        let admin_id = ctx.require_admin()?;
        let input = input.validated(Utc::now())?;

        let key = dedup_key(&input.name, input.scheduled_at, &input.address);
        if self.events().find_by_dedup_key(&key).await?.is_some() {
            return Err(duplicate_event());
        }

        let event = self
            .events()
            .create(CreateEvent {
                name: input.name,
                scheduled_at: input.scheduled_at,
                address: input.address,
                total_slots: input.total_slots,
                status: input.status,
                additional_info: input.additional_info,
                created_by: admin_id,
            })
            .await?;

        info!(event_id = %event.id, %admin_id, total_slots = event.total_slots, "Event created");
        Ok(event)
    }

    /// Lists events by date. Callers other than admins only ever see
    /// published events, whatever status they ask for.
    pub async fn list_events(
        &self,
        ctx: Option<&AuthContext>,
        mut filter: EventFilter,
        pagination: Pagination,
    ) -> ScreeningResult<PaginatedResult<Event>> {
        let is_admin = ctx.is_some_and(AuthContext::is_admin);
        if !is_admin {
            filter.status = Some(EventStatus::Published);
        }
        self.events().list(filter, pagination).await
    }

    /// Draft events are reported as missing to anyone but admins.
    pub async fn get_event(&self, ctx: Option<&AuthContext>, event_id: Uuid) -> ScreeningResult<Event> {
        let event = self.events().get_by_id(event_id).await?;
        if !event.is_published() && !ctx.is_some_and(AuthContext::is_admin) {
            return Err(ScreeningError::not_found("event", event_id));
        }
        Ok(event)
    }

    /// Replaces an event's details and capacity. Only its creator may do
    /// so, and capacity may not drop below the slots already booked.
    pub async fn update_event(
        &self,
        ctx: &AuthContext,
        event_id: Uuid,
        input: EventInput,
    ) -> ScreeningResult<Event> {
        self.owned_event(ctx, event_id).await?;
        let input = input.validated(Utc::now())?;

        let key = dedup_key(&input.name, input.scheduled_at, &input.address);
        if let Some(other) = self.events().find_by_dedup_key(&key).await?
            && other.id != event_id
        {
            return Err(duplicate_event());
        }

        let _guard = self.capacity.lock_event(event_id).await;
        let current = self.events().get_by_id(event_id).await?;
        if current.total_slots != input.total_slots {
            self.capacity.resize(event_id, input.total_slots).await?;
        }

        let event = self
            .events()
            .update_details(
                event_id,
                EventDetails {
                    name: input.name,
                    scheduled_at: input.scheduled_at,
                    address: input.address,
                    status: input.status,
                    additional_info: input.additional_info,
                },
            )
            .await?;

        info!(%event_id, admin_id = %ctx.user_id, "Event updated");
        Ok(event)
    }

    /// Deletes an event that no booking has ever referenced.
    pub async fn delete_event(&self, ctx: &AuthContext, event_id: Uuid) -> ScreeningResult<()> {
        self.owned_event(ctx, event_id).await?;

        let _guard = self.capacity.lock_event(event_id).await;
        let referenced = self.bookings.count_by_event(event_id).await?;
        if referenced > 0 {
            return Err(ScreeningError::Conflict {
                reason: format!("event has {referenced} booking(s) and cannot be deleted"),
            });
        }

        self.events().delete(event_id).await?;
        info!(%event_id, admin_id = %ctx.user_id, "Event deleted");
        Ok(())
    }
}
