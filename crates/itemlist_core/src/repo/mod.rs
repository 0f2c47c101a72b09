//! Backing collaborators for the record store.
//!
//! # Responsibility
//! - Define the snapshot and remote-collection persistence contracts.
//! - Keep serialization, SQL and HTTP details out of the controller.
//!
//! # Invariants
//! - Backends report failures as `StoreError`; degrading to an empty
//!   collection is the controller's decision, not the backend's.

pub mod kv_store;
pub mod remote_collection;
pub mod snapshot_store;
pub mod store_error;
