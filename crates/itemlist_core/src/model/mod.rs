//! Domain model for the item list.
//!
//! # Responsibility
//! - Define the record shape shared by every storage backend.
//! - Keep draft normalization next to the data it produces.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod record;
