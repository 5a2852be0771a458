//! Projects schema bootstrap.
//!
//! # Responsibility
//! - Create the `project`, `material`, `step`, `category` and
//!   `project_category` tables on an empty database.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - The applied schema version is mirrored to `PRAGMA user_version`.
//! - Creation runs in one transaction; a failed bootstrap leaves no tables.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = include_str!("0001_projects.sql");

/// Tables every connection must expose after bootstrap.
pub const REQUIRED_TABLES: &[&str] = &[
    "project",
    "material",
    "step",
    "category",
    "project_category",
];

/// Returns the schema version written by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Creates the projects schema when the database has not been initialized.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            supported: SCHEMA_VERSION,
        });
    }

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
