//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Uniqueness invariants (house
//! address, counter serial number, apartment number within a house,
//! one reading per counter per month) are backed by UNIQUE indexes.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
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

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
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
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD surname ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Admin', 'User'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Houses
-- =======================================================================
DEFINE TABLE house SCHEMAFULL;
DEFINE FIELD address ON TABLE house TYPE string;
DEFINE FIELD info ON TABLE house TYPE string;
DEFINE FIELD start_readings_day ON TABLE house TYPE int DEFAULT 1 \
    ASSERT $value >= 1 AND $value <= 31;
DEFINE FIELD end_readings_day ON TABLE house TYPE int DEFAULT 30 \
    ASSERT $value >= 1 AND $value <= 31;
DEFINE FIELD managers ON TABLE house TYPE array DEFAULT [];
DEFINE FIELD managers.* ON TABLE house TYPE string;
DEFINE INDEX idx_house_address ON TABLE house COLUMNS address UNIQUE;

-- =======================================================================
-- Apartments
-- =======================================================================
DEFINE TABLE apartment SCHEMAFULL;
DEFINE FIELD house_id ON TABLE apartment TYPE string;
DEFINE FIELD owner_id ON TABLE apartment TYPE string;
DEFINE FIELD entrance ON TABLE apartment TYPE string;
DEFINE FIELD floor ON TABLE apartment TYPE string;
DEFINE FIELD number ON TABLE apartment TYPE string;
DEFINE FIELD residents ON TABLE apartment TYPE array DEFAULT [];
DEFINE FIELD residents.* ON TABLE apartment TYPE string;
DEFINE INDEX idx_apartment_house_number ON TABLE apartment \
    COLUMNS house_id, number UNIQUE;
DEFINE INDEX idx_apartment_house ON TABLE apartment COLUMNS house_id;

-- =======================================================================
-- Counters (metering devices)
-- =======================================================================
DEFINE TABLE counter SCHEMAFULL;
DEFINE FIELD apartment_id ON TABLE counter TYPE string;
DEFINE FIELD kind ON TABLE counter TYPE string \
    ASSERT $value IN ['electricity', 'hot_water', 'cold_water', 'gas'];
DEFINE FIELD serial_number ON TABLE counter TYPE string;
DEFINE FIELD name ON TABLE counter TYPE string;
DEFINE FIELD active ON TABLE counter TYPE bool DEFAULT false;
DEFINE INDEX idx_counter_serial ON TABLE counter \
    COLUMNS serial_number UNIQUE;
DEFINE INDEX idx_counter_apartment ON TABLE counter \
    COLUMNS apartment_id;

-- =======================================================================
-- Readings (flat collection, one per counter per calendar month)
-- =======================================================================
DEFINE TABLE reading SCHEMAFULL;
DEFINE FIELD counter_id ON TABLE reading TYPE string;
DEFINE FIELD user_id ON TABLE reading TYPE string;
DEFINE FIELD value ON TABLE reading TYPE float ASSERT $value >= 0;
DEFINE FIELD year ON TABLE reading TYPE int;
DEFINE FIELD month ON TABLE reading TYPE int \
    ASSERT $value >= 1 AND $value <= 12;
DEFINE FIELD created_at ON TABLE reading TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_reading_counter_month ON TABLE reading \
    COLUMNS counter_id, year, month UNIQUE;

-- =======================================================================
-- Events (notifications)
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD user_id ON TABLE event TYPE string;
DEFINE FIELD kind ON TABLE event TYPE string \
    ASSERT $value IN ['notification', 'news', 'system'];
DEFINE FIELD title ON TABLE event TYPE string;
DEFINE FIELD details ON TABLE event TYPE string;
DEFINE FIELD read ON TABLE event TYPE bool DEFAULT false;
DEFINE FIELD sender_id ON TABLE event TYPE string;
DEFINE FIELD house_id ON TABLE event TYPE option<string>;
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_user ON TABLE event COLUMNS user_id;

-- =======================================================================
-- Sessions
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD ip ON TABLE session TYPE option<string>;
DEFINE FIELD device_info ON TABLE session TYPE option<string>;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Counter change requests (always pending; resolution deletes)
-- =======================================================================
DEFINE TABLE change_request SCHEMAFULL;
DEFINE FIELD counter_id ON TABLE change_request TYPE string;
DEFINE FIELD kind ON TABLE change_request TYPE string \
    ASSERT $value IN ['Add', 'Delete'];
DEFINE FIELD reason ON TABLE change_request TYPE string;
DEFINE FIELD house_id ON TABLE change_request TYPE string;
DEFINE FIELD user_id ON TABLE change_request TYPE string;
DEFINE FIELD counter_kind ON TABLE change_request TYPE string \
    ASSERT $value IN ['electricity', 'hot_water', 'cold_water', 'gas'];
DEFINE FIELD counter_serial_number ON TABLE change_request TYPE string;
DEFINE FIELD apartment_number ON TABLE change_request TYPE string;
DEFINE FIELD created_at ON TABLE change_request TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_request_house ON TABLE change_request COLUMNS house_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
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

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
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

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
