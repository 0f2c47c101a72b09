//! Composition of a controller from `StoreConfig`.

use crate::clock::{Clock, SystemClock};
use crate::config::{BackendConfig, ConfigError, IdScheme, StoreConfig, DEFAULT_HTTP_TIMEOUT_MS};
use crate::identity::{IdGenerator, TimestampIdGenerator, UuidIdGenerator};
use crate::repo::kv_store::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
use crate::repo::remote_collection::HttpCollection;
use crate::repo::snapshot_store::KvSnapshotStore;
use crate::repo::store_error::StoreError;
use crate::service::controller::RecordController;
use crate::service::local_store::LocalRecordStore;
use crate::service::remote_store::RemoteRecordStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Failure to build a controller.
#[derive(Debug)]
pub enum OpenStoreError {
    Config(ConfigError),
    Store(StoreError),
}

impl Display for OpenStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid store config: {err}"),
            Self::Store(err) => write!(f, "failed to open store: {err}"),
        }
    }
}

impl Error for OpenStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for OpenStoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for OpenStoreError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Builds a controller for `config`. The collection is not loaded yet.
pub fn open_record_store(
    config: &StoreConfig,
) -> Result<Box<dyn RecordController>, OpenStoreError> {
    config.validate()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let controller: Box<dyn RecordController> = match &config.backend {
        BackendConfig::Memory => local(config, MemoryKeyValueStore::new(), clock),
        BackendConfig::File { dir } => local(config, FileKeyValueStore::open(dir)?, clock),
        BackendConfig::Sqlite { path } => local(config, SqliteKeyValueStore::open(path)?, clock),
        BackendConfig::Http { base_url, .. } => {
            let timeout = config
                .http_timeout()
                .unwrap_or(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS));
            let remote = HttpCollection::new(base_url, timeout)?.with_clock(clock);
            Box::new(RemoteRecordStore::new(remote))
        }
    };

    info!(
        "event=store_open module=service status=ok backend={}",
        backend_name(&config.backend)
    );
    Ok(controller)
}

fn local<K: KeyValueStore + 'static>(
    config: &StoreConfig,
    kv: K,
    clock: Arc<dyn Clock>,
) -> Box<dyn RecordController> {
    let ids: Box<dyn IdGenerator + Send> = match config.id_scheme {
        IdScheme::Uuid => Box::new(UuidIdGenerator),
        IdScheme::Timestamp => Box::new(TimestampIdGenerator::new(Arc::clone(&clock))),
    };
    let store = LocalRecordStore::new(KvSnapshotStore::with_key(kv, config.storage_key.as_str()))
        .with_boxed_id_generator(ids)
        .with_clock(clock)
        .with_write_policy(config.write_policy);
    Box::new(store)
}

fn backend_name(backend: &BackendConfig) -> &'static str {
    match backend {
        BackendConfig::Memory => "memory",
        BackendConfig::File { .. } => "file",
        BackendConfig::Sqlite { .. } => "sqlite",
        BackendConfig::Http { .. } => "http",
    }
}
