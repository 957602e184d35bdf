//! SurrealDB implementation of [`OtpRepository`].

use chrono::{DateTime, Utc};
use screenbook_core::error::ScreeningResult;
use screenbook_core::models::otp::{CreateOtpCode, OtpCode, OtpPurpose};
use screenbook_core::repository::OtpRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OtpRow {
    phone_number: String,
    code_hash: String,
    purpose: String,
    scope: Option<String>,
    expires_at: DateTime<Utc>,
    consumed: bool,
    attempts: u32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OtpRowWithId {
    record_id: String,
    phone_number: String,
    code_hash: String,
    purpose: String,
    scope: Option<String>,
    expires_at: DateTime<Utc>,
    consumed: bool,
    attempts: u32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AttemptsRow {
    attempts: u32,
}

fn parse_purpose(s: &str) -> Result<OtpPurpose, DbError> {
    match s {
        "registration" => Ok(OtpPurpose::Registration),
        "login" => Ok(OtpPurpose::Login),
        "result_access" => Ok(OtpPurpose::ResultAccess),
        other => Err(DbError::Migration(format!("unknown OTP purpose: {other}"))),
    }
}

impl OtpRow {
    fn into_otp(self, id: Uuid) -> Result<OtpCode, DbError> {
        Ok(OtpCode {
            id,
            phone_number: self.phone_number,
            code_hash: self.code_hash,
            purpose: parse_purpose(&self.purpose)?,
            scope: self.scope,
            expires_at: self.expires_at,
            consumed: self.consumed,
            attempts: self.attempts,
            created_at: self.created_at,
        })
    }
}

impl OtpRowWithId {
    fn try_into_otp(self) -> Result<OtpCode, DbError> {
        let id = Uuid::parse_str(&self.record_id).map_err(|e| DbError::invalid_uuid("otp", e))?;
        Ok(OtpCode {
            id,
            phone_number: self.phone_number,
            code_hash: self.code_hash,
            purpose: parse_purpose(&self.purpose)?,
            scope: self.scope,
            expires_at: self.expires_at,
            consumed: self.consumed,
            attempts: self.attempts,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the OTP repository.
#[derive(Clone)]
pub struct SurrealOtpRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOtpRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OtpRepository for SurrealOtpRepository<C> {
    async fn create(&self, input: CreateOtpCode) -> ScreeningResult<OtpCode> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('otp_code', $id) SET \
                 phone_number = $phone_number, \
                 code_hash = $code_hash, \
                 purpose = $purpose, \
                 scope = $scope, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("phone_number", input.phone_number))
            .bind(("code_hash", input.code_hash))
            .bind(("purpose", input.purpose.as_str()))
            .bind(("scope", input.scope))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp_code".into(),
            id: id_str,
        })?;

        Ok(row.into_otp(id)?)
    }

    async fn get_latest_active(
        &self,
        phone_number: &str,
        purpose: OtpPurpose,
    ) -> ScreeningResult<OtpCode> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM otp_code \
                 WHERE phone_number = $phone_number \
                 AND purpose = $purpose AND consumed = false \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("phone_number", phone_number.to_string()))
            .bind(("purpose", purpose.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OtpRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp_code".into(),
            id: format!("phone_number={phone_number}, purpose={purpose}"),
        })?;

        Ok(row.try_into_otp()?)
    }

    async fn invalidate_all(&self, phone_number: &str, purpose: OtpPurpose) -> ScreeningResult<u64> {
        let mut result = self
            .db
            .query(
                "UPDATE otp_code SET consumed = true \
                 WHERE phone_number = $phone_number \
                 AND purpose = $purpose AND consumed = false",
            )
            .bind(("phone_number", phone_number.to_string()))
            .bind(("purpose", purpose.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AttemptsRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn record_attempt(&self, id: Uuid) -> ScreeningResult<u32> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("UPDATE type::record('otp_code', $id) SET attempts += 1")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AttemptsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp_code".into(),
            id: id_str,
        })?;

        Ok(row.attempts)
    }

    async fn consume(&self, id: Uuid) -> ScreeningResult<bool> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('otp_code', $id) SET consumed = true \
                 WHERE consumed = false",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AttemptsRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn cleanup_expired(&self) -> ScreeningResult<u64> {
        // Count expired codes first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM otp_code \
                 WHERE expires_at < time::now() GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE otp_code WHERE expires_at < time::now()")
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
