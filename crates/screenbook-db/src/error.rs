//! Database-specific error types and conversions.

use screenbook_core::error::ScreeningError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classifies a failed statement, surfacing unique index violations
    /// as [`DbError::Duplicate`].
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        if err.to_string().contains("already contains") {
            Self::Duplicate {
                entity: entity.into(),
            }
        } else {
            Self::Migration(err.to_string())
        }
    }

    pub(crate) fn invalid_uuid(field: &str, err: uuid::Error) -> Self {
        Self::Migration(format!("invalid {field} UUID: {err}"))
    }
}

impl From<DbError> for ScreeningError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ScreeningError::NotFound { entity, id },
            DbError::Duplicate { entity } => ScreeningError::Duplicate { entity },
            other => ScreeningError::Database(other.to_string()),
        }
    }
}
