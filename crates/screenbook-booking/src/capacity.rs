//! Event capacity manager.
//!
//! Owns the `total_slots`/`available_slots` pair of every event. All
//! changes go through single conditional statements in the
//! [`EventRepository`]; callers that need a check-then-act sequence
//! around a reservation hold [`CapacityManager::lock_event`] for its
//! duration.

use screenbook_core::context::AuthContext;
use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::models::event::Event;
use screenbook_core::repository::EventRepository;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};
use uuid::Uuid;

use crate::locks::EventLocks;

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reservation {
    /// A slot was consumed.
    Confirmed,
    /// The event was full; nothing was consumed.
    Waitlisted,
}

#[derive(Clone)]
pub struct CapacityManager<E: EventRepository> {
    events: E,
    locks: EventLocks,
}

impl<E: EventRepository> CapacityManager<E> {
    pub fn new(events: E) -> Self {
        Self {
            events,
            locks: EventLocks::new(),
        }
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    /// Exclusive access to the event for a multi-step operation.
    pub async fn lock_event(&self, event_id: Uuid) -> OwnedMutexGuard<()> {
        self.locks.acquire(event_id).await
    }

    /// Consumes a slot if one is free. A full event yields
    /// [`Reservation::Waitlisted`] and is left untouched.
    ///
    /// Participants may only reserve on published events.
    pub async fn reserve_slot(
        &self,
        event_id: Uuid,
        actor: &AuthContext,
    ) -> ScreeningResult<(Reservation, Event)> {
        let event = self.events.get_by_id(event_id).await?;
        if !event.is_published() && !actor.is_admin() {
            return Err(ScreeningError::NotPublished {
                event_id: event_id.to_string(),
            });
        }

        match self.events.try_reserve_slot(event_id).await? {
            Some(updated) => {
                debug!(%event_id, available = updated.available_slots, "Slot reserved");
                Ok((Reservation::Confirmed, updated))
            }
            None => {
                info!(%event_id, "Event full, reservation waitlisted");
                let current = self.events.get_by_id(event_id).await?;
                Ok((Reservation::Waitlisted, current))
            }
        }
    }

    /// Returns one slot, never exceeding `total_slots`.
    pub async fn release_slot(&self, event_id: Uuid) -> ScreeningResult<Event> {
        let event = self.events.release_slot(event_id).await?;
        debug!(%event_id, available = event.available_slots, "Slot released");
        Ok(event)
    }

    /// Changes the event's capacity, keeping every booked slot booked.
    pub async fn resize(&self, event_id: Uuid, new_total: u32) -> ScreeningResult<Event> {
        match self.events.resize(event_id, new_total).await? {
            Some(event) => {
                info!(%event_id, total = new_total, available = event.available_slots, "Event resized");
                Ok(event)
            }
            None => {
                let event = self.events.get_by_id(event_id).await?;
                Err(ScreeningError::InvalidCapacity {
                    requested: new_total,
                    booked: event.booked_slots(),
                })
            }
        }
    }
}
