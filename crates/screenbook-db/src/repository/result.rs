//! SurrealDB implementation of [`ResultRepository`].

use chrono::{DateTime, Utc};
use screenbook_core::error::ScreeningResult;
use screenbook_core::models::result::{CreateMedicalResult, MedicalResult, ResultCategory};
use screenbook_core::repository::{PaginatedResult, Pagination, ResultRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ResultRow {
    booking_id: String,
    category: String,
    notes: Option<String>,
    file_key: String,
    uploaded_by: String,
    uploaded_at: DateTime<Utc>,
    sms_sent: bool,
    sms_sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct ResultRowWithId {
    record_id: String,
    booking_id: String,
    category: String,
    notes: Option<String>,
    file_key: String,
    uploaded_by: String,
    uploaded_at: DateTime<Utc>,
    sms_sent: bool,
    sms_sent_at: Option<DateTime<Utc>>,
}

impl ResultRow {
    fn into_result(self, id: Uuid) -> Result<MedicalResult, DbError> {
        Ok(MedicalResult {
            id,
            booking_id: Uuid::parse_str(&self.booking_id)
                .map_err(|e| DbError::invalid_uuid("booking", e))?,
            category: ResultCategory::from(self.category),
            notes: self.notes,
            file_key: self.file_key,
            uploaded_by: Uuid::parse_str(&self.uploaded_by)
                .map_err(|e| DbError::invalid_uuid("admin", e))?,
            uploaded_at: self.uploaded_at,
            sms_sent: self.sms_sent,
            sms_sent_at: self.sms_sent_at,
        })
    }
}

impl ResultRowWithId {
    fn try_into_result(self) -> Result<MedicalResult, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::invalid_uuid("medical_result", e))?;
        ResultRow {
            booking_id: self.booking_id,
            category: self.category,
            notes: self.notes,
            file_key: self.file_key,
            uploaded_by: self.uploaded_by,
            uploaded_at: self.uploaded_at,
            sms_sent: self.sms_sent,
            sms_sent_at: self.sms_sent_at,
        }
        .into_result(id)
    }
}

/// SurrealDB implementation of the medical result repository.
#[derive(Clone)]
pub struct SurrealResultRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResultRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResultRepository for SurrealResultRepository<C> {
    async fn create(&self, input: CreateMedicalResult) -> ScreeningResult<MedicalResult> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('medical_result', $id) SET \
                 booking_id = $booking_id, \
                 category = $category, \
                 notes = $notes, \
                 file_key = $file_key, \
                 uploaded_by = $uploaded_by, \
                 sms_sent = false, \
                 sms_sent_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("booking_id", input.booking_id.to_string()))
            .bind(("category", String::from(input.category)))
            .bind(("notes", input.notes))
            .bind(("file_key", input.file_key))
            .bind(("uploaded_by", input.uploaded_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("medical_result", e))?;

        let rows: Vec<ResultRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "medical_result".into(),
            id: id_str,
        })?;

        Ok(row.into_result(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> ScreeningResult<MedicalResult> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('medical_result', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResultRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "medical_result".into(),
            id: id_str,
        })?;

        Ok(row.into_result(id)?)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> ScreeningResult<Option<MedicalResult>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM medical_result \
                 WHERE booking_id = $booking_id LIMIT 1",
            )
            .bind(("booking_id", booking_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResultRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_result()?)),
            None => Ok(None),
        }
    }

    async fn list(&self, pagination: Pagination) -> ScreeningResult<PaginatedResult<MedicalResult>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM medical_result GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM medical_result \
                 ORDER BY uploaded_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResultRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_result())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn mark_sms_sent(&self, id: Uuid) -> ScreeningResult<Option<MedicalResult>> {
        let result = self
            .db
            .query(
                "UPDATE type::record('medical_result', $id) SET \
                 sms_sent = true, sms_sent_at = time::now() \
                 WHERE sms_sent = false",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ResultRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_result(id)?)),
            None => Ok(None),
        }
    }

    async fn clear_sms_sent(&self, id: Uuid) -> ScreeningResult<()> {
        self.db
            .query(
                "UPDATE type::record('medical_result', $id) SET \
                 sms_sent = false, sms_sent_at = NONE",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }
}
