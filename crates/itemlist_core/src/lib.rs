//! Core logic for the item list: records, storage backends and the
//! controller that keeps them in sync.

pub mod clock;
pub mod config;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BackendConfig, ConfigError, IdScheme, StoreConfig, WritePolicy};
pub use identity::{IdGenerator, SequenceIdGenerator, TimestampIdGenerator, UuidIdGenerator};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{Record, RecordDraft, RecordId, RecordValidationError};
pub use repo::kv_store::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use repo::remote_collection::{HttpCollection, InMemoryCollection, RemoteCollection};
pub use repo::snapshot_store::{KvSnapshotStore, SnapshotStore, DEFAULT_STORAGE_KEY};
pub use repo::store_error::{StoreError, StoreResult};
pub use service::controller::{ControllerError, ControllerResult, RecordController};
pub use service::factory::{open_record_store, OpenStoreError};
pub use service::local_store::LocalRecordStore;
pub use service::remote_store::RemoteRecordStore;
pub use service::session::{EditSession, RecordList, StoreSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
