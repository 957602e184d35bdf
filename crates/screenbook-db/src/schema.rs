//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Administrators
-- =======================================================================
DEFINE TABLE admin SCHEMAFULL;
DEFINE FIELD name ON TABLE admin TYPE string;
DEFINE FIELD email ON TABLE admin TYPE string;
DEFINE FIELD password_hash ON TABLE admin TYPE string;
DEFINE FIELD created_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE admin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_admin_email ON TABLE admin COLUMNS email UNIQUE;

-- =======================================================================
-- Participants
-- =======================================================================
DEFINE TABLE participant SCHEMAFULL;
DEFINE FIELD name ON TABLE participant TYPE string;
DEFINE FIELD phone_number ON TABLE participant TYPE string;
DEFINE FIELD national_id ON TABLE participant TYPE string;
DEFINE FIELD phone_verified ON TABLE participant TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE participant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE participant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_participant_phone ON TABLE participant \
    COLUMNS phone_number UNIQUE;
DEFINE INDEX idx_participant_national_id ON TABLE participant \
    COLUMNS national_id UNIQUE;

-- =======================================================================
-- One-time codes
-- =======================================================================
DEFINE TABLE otp_code SCHEMAFULL;
DEFINE FIELD phone_number ON TABLE otp_code TYPE string;
DEFINE FIELD code_hash ON TABLE otp_code TYPE string;
DEFINE FIELD purpose ON TABLE otp_code TYPE string \
    ASSERT $value IN ['registration', 'login', 'result_access'];
DEFINE FIELD scope ON TABLE otp_code TYPE option<string>;
DEFINE FIELD expires_at ON TABLE otp_code TYPE datetime;
DEFINE FIELD consumed ON TABLE otp_code TYPE bool DEFAULT false;
DEFINE FIELD attempts ON TABLE otp_code TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE otp_code TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_otp_phone_purpose ON TABLE otp_code \
    COLUMNS phone_number, purpose;

-- =======================================================================
-- Events
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD name ON TABLE event TYPE string;
DEFINE FIELD scheduled_at ON TABLE event TYPE datetime;
DEFINE FIELD address ON TABLE event TYPE string;
DEFINE FIELD total_slots ON TABLE event TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD available_slots ON TABLE event TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD status ON TABLE event TYPE string \
    ASSERT $value IN ['draft', 'published'];
DEFINE FIELD additional_info ON TABLE event TYPE option<string>;
DEFINE FIELD created_by ON TABLE event TYPE string;
DEFINE FIELD dedup_key ON TABLE event TYPE string;
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_dedup ON TABLE event COLUMNS dedup_key;
DEFINE INDEX idx_event_created_by ON TABLE event COLUMNS created_by;
DEFINE INDEX idx_event_scheduled_at ON TABLE event COLUMNS scheduled_at;

-- =======================================================================
-- Bookings
-- =======================================================================
DEFINE TABLE booking SCHEMAFULL;
DEFINE FIELD reference ON TABLE booking TYPE string;
DEFINE FIELD participant_id ON TABLE booking TYPE string;
DEFINE FIELD event_id ON TABLE booking TYPE string;
DEFINE FIELD status ON TABLE booking TYPE string \
    ASSERT $value IN ['confirmed', 'checked_in', 'cancelled', \
    'completed'];
DEFINE FIELD holds_slot ON TABLE booking TYPE bool;
DEFINE FIELD booked_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD cancelled_at ON TABLE booking TYPE option<datetime>;
DEFINE INDEX idx_booking_reference ON TABLE booking \
    COLUMNS reference UNIQUE;
DEFINE INDEX idx_booking_participant_event ON TABLE booking \
    COLUMNS participant_id, event_id;
DEFINE INDEX idx_booking_event ON TABLE booking COLUMNS event_id;

-- =======================================================================
-- Medical results
-- =======================================================================
DEFINE TABLE medical_result SCHEMAFULL;
DEFINE FIELD booking_id ON TABLE medical_result TYPE string;
DEFINE FIELD category ON TABLE medical_result TYPE string;
DEFINE FIELD notes ON TABLE medical_result TYPE option<string>;
DEFINE FIELD file_key ON TABLE medical_result TYPE string;
DEFINE FIELD uploaded_by ON TABLE medical_result TYPE string;
DEFINE FIELD uploaded_at ON TABLE medical_result TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD sms_sent ON TABLE medical_result TYPE bool DEFAULT false;
DEFINE FIELD sms_sent_at ON TABLE medical_result \
    TYPE option<datetime>;
DEFINE INDEX idx_result_booking ON TABLE medical_result \
    COLUMNS booking_id UNIQUE;
";

/// Run all pending schema migrations.
///
/// Creates the `_migration` tracking table if it does not exist, then
/// applies each migration whose version exceeds the highest recorded
/// one.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
