//! Whole-collection snapshot persistence.
//!
//! # Responsibility
//! - Serialize the full ordered collection as JSON text under one key.
//! - Decode it back without reordering.
//!
//! # Invariants
//! - A missing key decodes to an empty collection.
//! - Undecodable text is reported as `StoreError::InvalidData`; callers decide
//!   how to degrade.

use crate::model::record::Record;
use crate::repo::kv_store::KeyValueStore;
use crate::repo::store_error::{StoreError, StoreResult};

/// Storage key used by earlier clients of the item list.
pub const DEFAULT_STORAGE_KEY: &str = "simple_crud_items_v1";

/// Backing collaborator that reads and writes the collection as a whole.
pub trait SnapshotStore {
    fn fetch_all(&mut self) -> StoreResult<Vec<Record>>;
    fn persist_all(&mut self, records: &[Record]) -> StoreResult<()>;
}

/// Snapshot store on top of any `KeyValueStore`.
#[derive(Debug, Clone)]
pub struct KvSnapshotStore<K: KeyValueStore> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> KvSnapshotStore<K> {
    /// Uses the default storage key.
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying key-value store, e.g. to inspect raw text in tests.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }
}

impl<K: KeyValueStore> SnapshotStore for KvSnapshotStore<K> {
    fn fetch_all(&mut self) -> StoreResult<Vec<Record>> {
        let Some(raw) = self.kv.get(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| {
            StoreError::InvalidData(format!("snapshot under `{}`: {err}", self.key))
        })
    }

    fn persist_all(&mut self, records: &[Record]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        self.kv.set(&self.key, &raw)
    }
}
