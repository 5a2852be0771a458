//! Connection bootstrap for the projects database file.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections see the full projects schema.

use super::schema::apply_schema;
use super::DbResult;
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the projects database file, creating the schema when missing.
///
/// Every repository operation calls this once and drops the connection when
/// it returns, so the open path logs at `debug` on success.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();

    let mut conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error path={} duration_ms={} error_code=db_open_failed error={}",
                path.display(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok path={} duration_ms={}",
                path.display(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error path={} duration_ms={} error_code=db_bootstrap_failed error={}",
                path.display(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_schema(conn)?;
    Ok(())
}
