//! SurrealDB implementation of [`BookingRepository`].

use chrono::{DateTime, Utc};
use screenbook_core::error::ScreeningResult;
use screenbook_core::models::booking::{Booking, BookingStatus, CreateBooking};
use screenbook_core::repository::BookingRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct BookingRow {
    reference: String,
    participant_id: String,
    event_id: String,
    status: String,
    holds_slot: bool,
    booked_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct BookingRowWithId {
    record_id: String,
    reference: String,
    participant_id: String,
    event_id: String,
    status: String,
    holds_slot: bool,
    booked_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<BookingStatus, DbError> {
    match s {
        "confirmed" => Ok(BookingStatus::Confirmed),
        "checked_in" => Ok(BookingStatus::CheckedIn),
        "cancelled" => Ok(BookingStatus::Cancelled),
        "completed" => Ok(BookingStatus::Completed),
        other => Err(DbError::Migration(format!("unknown booking status: {other}"))),
    }
}

impl BookingRow {
    fn into_booking(self, id: Uuid) -> Result<Booking, DbError> {
        Ok(Booking {
            id,
            reference: self.reference,
            participant_id: Uuid::parse_str(&self.participant_id)
                .map_err(|e| DbError::invalid_uuid("participant", e))?,
            event_id: Uuid::parse_str(&self.event_id)
                .map_err(|e| DbError::invalid_uuid("event", e))?,
            status: parse_status(&self.status)?,
            holds_slot: self.holds_slot,
            booked_at: self.booked_at,
            cancelled_at: self.cancelled_at,
        })
    }
}

impl BookingRowWithId {
    fn try_into_booking(self) -> Result<Booking, DbError> {
        let id =
            Uuid::parse_str(&self.record_id).map_err(|e| DbError::invalid_uuid("booking", e))?;
        BookingRow {
            reference: self.reference,
            participant_id: self.participant_id,
            event_id: self.event_id,
            status: self.status,
            holds_slot: self.holds_slot,
            booked_at: self.booked_at,
            cancelled_at: self.cancelled_at,
        }
        .into_booking(id)
    }
}

/// SurrealDB implementation of the Booking repository.
#[derive(Clone)]
pub struct SurrealBookingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBookingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_many(
        &self,
        condition: &str,
        order: &str,
        field: &'static str,
        value: String,
    ) -> ScreeningResult<Vec<Booking>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM booking \
             WHERE {condition} ORDER BY {order}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind((field, value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;
        let bookings = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(bookings)
    }
}

impl<C: Connection> BookingRepository for SurrealBookingRepository<C> {
    async fn create(&self, input: CreateBooking) -> ScreeningResult<Booking> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('booking', $id) SET \
                 reference = $reference, \
                 participant_id = $participant_id, \
                 event_id = $event_id, \
                 status = 'confirmed', \
                 holds_slot = $holds_slot, \
                 cancelled_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("reference", input.reference))
            .bind(("participant_id", input.participant_id.to_string()))
            .bind(("event_id", input.event_id.to_string()))
            .bind(("holds_slot", input.holds_slot))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("booking", e))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> ScreeningResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('booking', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn find_active(
        &self,
        participant_id: Uuid,
        event_id: Uuid,
    ) -> ScreeningResult<Option<Booking>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM booking \
                 WHERE participant_id = $participant_id \
                 AND event_id = $event_id AND status != 'cancelled' \
                 LIMIT 1",
            )
            .bind(("participant_id", participant_id.to_string()))
            .bind(("event_id", event_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_booking()?)),
            None => Ok(None),
        }
    }

    async fn list_by_participant(&self, participant_id: Uuid) -> ScreeningResult<Vec<Booking>> {
        self.select_many(
            "participant_id = $participant_id",
            "booked_at DESC",
            "participant_id",
            participant_id.to_string(),
        )
        .await
    }

    async fn list_by_event(&self, event_id: Uuid) -> ScreeningResult<Vec<Booking>> {
        self.select_many(
            "event_id = $event_id",
            "booked_at ASC",
            "event_id",
            event_id.to_string(),
        )
        .await
    }

    async fn count_by_event(&self, event_id: Uuid) -> ScreeningResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM booking \
                 WHERE event_id = $event_id GROUP ALL",
            )
            .bind(("event_id", event_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> ScreeningResult<Option<Booking>> {
        let sets = if to == BookingStatus::Cancelled {
            "status = $to, cancelled_at = time::now()"
        } else {
            "status = $to"
        };
        let query = format!(
            "UPDATE type::record('booking', $id) SET {sets} \
             WHERE status = $from"
        );

        let result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("from", from.as_str()))
            .bind(("to", to.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_booking(id)?)),
            None => Ok(None),
        }
    }
}
