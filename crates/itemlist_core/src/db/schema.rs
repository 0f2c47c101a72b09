//! `kv_entries` layout and its version check.
//!
//! # Invariants
//! - A fresh database gets the table and `user_version = SCHEMA_VERSION`
//!   in one transaction.
//! - An existing table must carry every column in `REQUIRED_COLUMNS`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

pub const KV_TABLE: &str = "kv_entries";
pub const SCHEMA_VERSION: u32 = 1;

const REQUIRED_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];
const CREATE_KV_ENTRIES: &str = include_str!("kv_entries.sql");

/// Layout version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

pub(crate) fn ensure_kv_schema(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }

    if found < SCHEMA_VERSION {
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_KV_ENTRIES)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
        info!(
            "event=kv_schema_create module=db status=ok from_version={found} to_version={SCHEMA_VERSION}"
        );
    }

    check_columns(conn)
}

fn check_columns(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({KV_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    match REQUIRED_COLUMNS
        .into_iter()
        .find(|required| !columns.iter().any(|column| column.as_str() == *required))
    {
        Some(missing_column) => Err(DbError::IncompatibleTable { missing_column }),
        None => Ok(()),
    }
}
