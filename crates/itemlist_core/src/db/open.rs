//! Connections for the snapshot database.

use super::schema::ensure_kv_schema;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a snapshot database file, creating `kv_entries` when missing.
pub fn open_kv_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    prepare(Connection::open(path)?, &path.display().to_string())
}

/// Private in-memory snapshot database.
pub fn open_kv_db_in_memory() -> DbResult<Connection> {
    prepare(Connection::open_in_memory()?, ":memory:")
}

fn prepare(mut conn: Connection, location: &str) -> DbResult<Connection> {
    let started_at = Instant::now();
    conn.busy_timeout(BUSY_TIMEOUT)?;

    if let Err(err) = ensure_kv_schema(&mut conn) {
        error!(
            "event=kv_db_open module=db status=error location={location} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=kv_db_open module=db status=ok location={location} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}
