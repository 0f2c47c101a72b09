//! Record store controller contract.
//!
//! # Responsibility
//! - Define the operations every controller variant offers to callers.
//! - Provide the read-only and edit-marker operations once, on top of
//!   `StoreSession`.
//!
//! # Invariants
//! - Validation failures (`Validation`, `RecordNotFound`) never mutate state.
//! - Mutating operations take `&mut self` and run to completion, so at most
//!   one is in flight per controller and they apply in call order.

use crate::model::record::{Record, RecordDraft, RecordId, RecordValidationError};
use crate::repo::store_error::StoreError;
use crate::service::session::{EditSession, StoreSession};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Controller-level failure.
#[derive(Debug)]
pub enum ControllerError {
    /// Input rejected before touching state.
    Validation(RecordValidationError),
    /// `id` does not reference a record in the collection.
    RecordNotFound(RecordId),
    /// The id generator kept producing ids that are already taken.
    IdCollision(RecordId),
    /// Backing store failed; see the variant docs for what was applied.
    Persistence(StoreError),
}

impl ControllerError {
    /// True for failures the caller should present as input problems.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::RecordNotFound(_))
    }
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::RecordNotFound(id) => write!(f, "record not found: {id}"),
            Self::IdCollision(id) => write!(f, "could not allocate a unique id (last tried {id})"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::RecordNotFound(_) | Self::IdCollision(_) => None,
        }
    }
}

impl From<RecordValidationError> for ControllerError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

/// Owner of the in-memory collection and its synchronization with a backend.
pub trait RecordController {
    /// Replaces the collection with the backend's. Failures load nothing.
    ///
    /// Returns the number of records now held.
    fn load(&mut self) -> usize;

    /// Adds a record at the front of the collection.
    fn create(&mut self, title: &str, description: Option<&str>) -> ControllerResult<Record>;

    /// Replaces title/description of an existing record in place.
    fn update(
        &mut self,
        id: &RecordId,
        title: &str,
        description: Option<&str>,
    ) -> ControllerResult<Record>;

    /// Removes a record; `Ok(false)` when it was not present.
    fn delete(&mut self, id: &RecordId) -> ControllerResult<bool>;

    /// Removes every record. Callers must confirm with the user first.
    fn clear_all(&mut self) -> ControllerResult<usize>;

    fn session(&self) -> &StoreSession;

    fn session_mut(&mut self) -> &mut StoreSession;

    fn records(&self) -> &[Record] {
        self.session().list().as_slice()
    }

    fn len(&self) -> usize {
        self.session().list().len()
    }

    fn is_empty(&self) -> bool {
        self.session().list().is_empty()
    }

    /// Case-insensitive title/description search, in collection order.
    fn filter(&self, query: &str) -> Vec<&Record> {
        self.session().list().filter(query).collect()
    }

    /// Maps user-typed id text to a known record id.
    fn resolve_id(&self, text: &str) -> Option<RecordId> {
        self.session().list().resolve(text).cloned()
    }

    /// Enters edit mode and returns the draft to prefill the form with.
    fn begin_edit(&mut self, id: &RecordId) -> ControllerResult<RecordDraft> {
        self.session_mut()
            .begin_edit(id)
            .cloned()
            .ok_or_else(|| ControllerError::RecordNotFound(id.clone()))
    }

    fn cancel_edit(&mut self) {
        self.session_mut().cancel_edit();
    }

    fn editing(&self) -> Option<&EditSession> {
        self.session().editing()
    }

    /// Form submission: updates the record being edited, otherwise creates.
    fn submit(&mut self, title: &str, description: Option<&str>) -> ControllerResult<Record> {
        match self.editing().map(|session| session.id.clone()) {
            Some(id) => self.update(&id, title, description),
            None => self.create(title, description),
        }
    }
}
