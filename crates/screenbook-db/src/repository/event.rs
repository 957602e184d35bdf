//! SurrealDB implementation of [`EventRepository`].
//!
//! Slot counters are only ever changed by single conditional `UPDATE`
//! statements, so `0 <= available_slots <= total_slots` holds no matter
//! how callers interleave.

use chrono::{DateTime, Utc};
use screenbook_core::error::ScreeningResult;
use screenbook_core::models::event::{
    CreateEvent, Event, EventDetails, EventFilter, EventStatus, dedup_key,
};
use screenbook_core::repository::{EventRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct EventRow {
    name: String,
    scheduled_at: DateTime<Utc>,
    address: String,
    total_slots: u32,
    available_slots: u32,
    status: String,
    additional_info: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    name: String,
    scheduled_at: DateTime<Utc>,
    address: String,
    total_slots: u32,
    available_slots: u32,
    status: String,
    additional_info: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<EventStatus, DbError> {
    match s {
        "draft" => Ok(EventStatus::Draft),
        "published" => Ok(EventStatus::Published),
        other => Err(DbError::Migration(format!("unknown event status: {other}"))),
    }
}

fn status_to_string(s: EventStatus) -> &'static str {
    match s {
        EventStatus::Draft => "draft",
        EventStatus::Published => "published",
    }
}

impl EventRow {
    fn into_event(self, id: Uuid) -> Result<Event, DbError> {
        let created_by =
            Uuid::parse_str(&self.created_by).map_err(|e| DbError::invalid_uuid("admin", e))?;
        Ok(Event {
            id,
            name: self.name,
            scheduled_at: self.scheduled_at,
            address: self.address,
            total_slots: self.total_slots,
            available_slots: self.available_slots,
            status: parse_status(&self.status)?,
            additional_info: self.additional_info,
            created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, DbError> {
        let id = Uuid::parse_str(&self.record_id).map_err(|e| DbError::invalid_uuid("event", e))?;
        let created_by =
            Uuid::parse_str(&self.created_by).map_err(|e| DbError::invalid_uuid("admin", e))?;
        Ok(Event {
            id,
            name: self.name,
            scheduled_at: self.scheduled_at,
            address: self.address,
            total_slots: self.total_slots,
            available_slots: self.available_slots,
            status: parse_status(&self.status)?,
            additional_info: self.additional_info,
            created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Event repository.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Runs a conditional `UPDATE` on one event and returns the row it
    /// produced, if the condition matched.
    async fn conditional_update(
        &self,
        id: Uuid,
        sets: &str,
        condition: &str,
        new_total: Option<u32>,
    ) -> ScreeningResult<Option<Event>> {
        let query = format!(
            "UPDATE type::record('event', $id) SET {sets}, \
             updated_at = time::now() WHERE {condition}"
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));
        if let Some(total) = new_total {
            builder = builder.bind(("new_total", total));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_event(id)?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> EventRepository for SurrealEventRepository<C> {
    async fn create(&self, input: CreateEvent) -> ScreeningResult<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let key = dedup_key(&input.name, input.scheduled_at, &input.address);

        let result = self
            .db
            .query(
                "CREATE type::record('event', $id) SET \
                 name = $name, \
                 scheduled_at = $scheduled_at, \
                 address = $address, \
                 total_slots = $total_slots, \
                 available_slots = $total_slots, \
                 status = $status, \
                 additional_info = $additional_info, \
                 created_by = $created_by, \
                 dedup_key = $dedup_key",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("scheduled_at", input.scheduled_at))
            .bind(("address", input.address))
            .bind(("total_slots", input.total_slots))
            .bind(("status", status_to_string(input.status)))
            .bind(("additional_info", input.additional_info))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("dedup_key", key))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> ScreeningResult<Event> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('event', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn find_by_dedup_key(&self, key: &str) -> ScreeningResult<Option<Event>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM event \
                 WHERE dedup_key = $dedup_key LIMIT 1",
            )
            .bind(("dedup_key", key.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_event()?)),
            None => Ok(None),
        }
    }

    async fn update_details(&self, id: Uuid, details: EventDetails) -> ScreeningResult<Event> {
        let id_str = id.to_string();
        let key = dedup_key(&details.name, details.scheduled_at, &details.address);

        let result = self
            .db
            .query(
                "UPDATE type::record('event', $id) SET \
                 name = $name, \
                 scheduled_at = $scheduled_at, \
                 address = $address, \
                 status = $status, \
                 additional_info = $additional_info, \
                 dedup_key = $dedup_key, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", details.name))
            .bind(("scheduled_at", details.scheduled_at))
            .bind(("address", details.address))
            .bind(("status", status_to_string(details.status)))
            .bind(("additional_info", details.additional_info))
            .bind(("dedup_key", key))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn delete(&self, id: Uuid) -> ScreeningResult<()> {
        self.db
            .query("DELETE type::record('event', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn list(
        &self,
        filter: EventFilter,
        pagination: Pagination,
    ) -> ScreeningResult<PaginatedResult<Event>> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.date_from.is_some() {
            conditions.push("scheduled_at >= $date_from");
        }
        if filter.date_to.is_some() {
            conditions.push("scheduled_at <= $date_to");
        }
        if filter.location.is_some() {
            conditions.push("string::contains(string::lowercase(address), $location)");
        }
        if filter.created_by.is_some() {
            conditions.push("created_by = $created_by");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT count() AS total FROM event{where_clause} GROUP ALL");
        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM event{where_clause} \
             ORDER BY scheduled_at ASC LIMIT $limit START $offset"
        );

        let mut builder = self
            .db
            .query(&count_query)
            .query(&list_query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));

        if let Some(status) = filter.status {
            builder = builder.bind(("status", status_to_string(status)));
        }
        if let Some(date_from) = filter.date_from {
            builder = builder.bind(("date_from", date_from));
        }
        if let Some(date_to) = filter.date_to {
            builder = builder.bind(("date_to", date_to));
        }
        if let Some(location) = filter.location {
            builder = builder.bind(("location", location.trim().to_lowercase()));
        }
        if let Some(created_by) = filter.created_by {
            builder = builder.bind(("created_by", created_by.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<EventRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn try_reserve_slot(&self, id: Uuid) -> ScreeningResult<Option<Event>> {
        self.conditional_update(id, "available_slots -= 1", "available_slots > 0", None)
            .await
    }

    async fn release_slot(&self, id: Uuid) -> ScreeningResult<Event> {
        let released = self
            .conditional_update(
                id,
                "available_slots += 1",
                "available_slots < total_slots",
                None,
            )
            .await?;

        match released {
            Some(event) => Ok(event),
            None => self.get_by_id(id).await,
        }
    }

    async fn resize(&self, id: Uuid, new_total: u32) -> ScreeningResult<Option<Event>> {
        self.conditional_update(
            id,
            "available_slots = available_slots + $new_total - total_slots, \
             total_slots = $new_total",
            "total_slots - available_slots <= $new_total",
            Some(new_total),
        )
        .await
    }
}
