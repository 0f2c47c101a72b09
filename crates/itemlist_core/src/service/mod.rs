//! Record store controllers.
//!
//! # Responsibility
//! - Own the in-memory collection and edit marker.
//! - Keep it converged with the configured backing collaborator.
//!
//! # Invariants
//! - Callers reach storage only through `RecordController`.

pub mod controller;
pub mod factory;
pub mod local_store;
pub mod remote_store;
pub mod session;
