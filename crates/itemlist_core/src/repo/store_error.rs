//! Persistence-layer error shared by every backing collaborator.

use crate::db::DbError;
use crate::model::record::RecordId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure talking to a backing store or remote collection.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Db(DbError),
    /// Transport-level request failure, including timeouts.
    Network(reqwest::Error),
    /// Remote answered with a non-success HTTP status.
    Status { code: u16, url: String },
    /// Remote does not know the record.
    NotFound(RecordId),
    /// Stored or received data could not be decoded.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Network(err) => write!(f, "request failed: {err}"),
            Self::Status { code, url } => write!(f, "remote returned status {code} for {url}"),
            Self::NotFound(id) => write!(f, "remote record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Network(err) => Some(err),
            Self::Status { .. } | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl StoreError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::Db(_) => "db_error",
            Self::Network(_) => "network_error",
            Self::Status { .. } => "http_status",
            Self::NotFound(_) => "not_found",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}
