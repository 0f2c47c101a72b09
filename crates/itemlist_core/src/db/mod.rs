//! SQLite home of the key-value snapshot table.
//!
//! One table, `kv_entries`, keyed by storage key. Its layout version lives
//! in `PRAGMA user_version` and is checked every time a database is opened.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_kv_db, open_kv_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Written by a newer build with a layout this one cannot read.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// `kv_entries` exists but lacks a column snapshots depend on.
    IncompatibleTable { missing_column: &'static str },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "snapshot database layout v{db_version} is newer than supported v{latest_supported}"
            ),
            Self::IncompatibleTable { missing_column } => write!(
                f,
                "table `{}` has no `{missing_column}` column",
                schema::KV_TABLE
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::IncompatibleTable { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
