//! SurrealDB implementation of [`ParticipantRepository`].

use chrono::{DateTime, Utc};
use screenbook_core::error::ScreeningResult;
use screenbook_core::models::participant::{CreateParticipant, Participant};
use screenbook_core::repository::ParticipantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ParticipantRow {
    name: String,
    phone_number: String,
    national_id: String,
    phone_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ParticipantRowWithId {
    record_id: String,
    name: String,
    phone_number: String,
    national_id: String,
    phone_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ParticipantRow {
    fn into_participant(self, id: Uuid) -> Participant {
        Participant {
            id,
            name: self.name,
            phone_number: self.phone_number,
            national_id: self.national_id,
            phone_verified: self.phone_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ParticipantRowWithId {
    fn try_into_participant(self) -> Result<Participant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::invalid_uuid("participant", e))?;
        Ok(Participant {
            id,
            name: self.name,
            phone_number: self.phone_number,
            national_id: self.national_id,
            phone_verified: self.phone_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Participant repository.
#[derive(Clone)]
pub struct SurrealParticipantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealParticipantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(&self, field: &'static str, value: &str) -> ScreeningResult<Participant> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM participant \
             WHERE {field} = $value"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ParticipantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "participant".into(),
            id: format!("{field}={value}"),
        })?;

        Ok(row.try_into_participant()?)
    }
}

impl<C: Connection> ParticipantRepository for SurrealParticipantRepository<C> {
    async fn create(&self, input: CreateParticipant) -> ScreeningResult<Participant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('participant', $id) SET \
                 name = $name, \
                 phone_number = $phone_number, \
                 national_id = $national_id, \
                 phone_verified = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("phone_number", input.phone_number))
            .bind(("national_id", input.national_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("participant", e))?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "participant".into(),
            id: id_str,
        })?;

        Ok(row.into_participant(id))
    }

    async fn get_by_id(&self, id: Uuid) -> ScreeningResult<Participant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('participant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "participant".into(),
            id: id_str,
        })?;

        Ok(row.into_participant(id))
    }

    async fn get_by_phone(&self, phone_number: &str) -> ScreeningResult<Participant> {
        self.find_one("phone_number", phone_number).await
    }

    async fn get_by_national_id(&self, national_id: &str) -> ScreeningResult<Participant> {
        self.find_one("national_id", national_id).await
    }

    async fn discard_pending(&self, id: Uuid) -> ScreeningResult<bool> {
        let result = self
            .db
            .query(
                "DELETE type::record('participant', $id) \
                 WHERE phone_verified = false RETURN BEFORE",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn mark_phone_verified(&self, id: Uuid) -> ScreeningResult<Participant> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('participant', $id) SET \
                 phone_verified = true, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "participant".into(),
            id: id_str,
        })?;

        Ok(row.into_participant(id))
    }
}
