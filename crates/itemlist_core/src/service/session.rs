//! In-memory collection and edit-marker state owned by one controller.
//!
//! # Responsibility
//! - Hold the ordered collection and enforce id uniqueness on every insert.
//! - Track which record, if any, is being edited and its draft values.
//!
//! # Invariants
//! - No two records share an `id`.
//! - The editing marker never references a record that is not in the list.
//! - Collection mutators are crate-private; outside callers only read or
//!   move the edit marker.

use crate::model::record::{Record, RecordDraft, RecordId};
use log::warn;
use std::collections::HashSet;

/// Ordered, newest-first record collection with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordList {
    records: Vec<Record>,
}

impl RecordList {
    /// Builds a list from backend data, dropping records that break
    /// invariants (blank title or id, repeated id). First occurrence wins.
    pub fn from_loaded(records: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());
        let mut dropped = 0_usize;
        for record in records {
            if record.validate().is_err() || !seen.insert(record.id.clone()) {
                dropped += 1;
                continue;
            }
            kept.push(record);
        }
        if dropped > 0 {
            warn!(
                "event=records_sanitize module=service status=degraded dropped={} kept={}",
                dropped,
                kept.len()
            );
        }
        Self { records: kept }
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Finds the id whose display form equals `text`.
    pub fn resolve(&self, text: &str) -> Option<&RecordId> {
        let text = text.trim();
        self.records
            .iter()
            .map(|record| &record.id)
            .find(|id| id.to_string() == text)
    }

    /// Records whose title or description contains `query`, ignoring case.
    ///
    /// Lazy and order-preserving; an empty query yields every record.
    pub fn filter<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Record> + 'a {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .filter(move |record| record.matches_lowercase(&needle))
    }

    /// Inserts at the front. Returns the record back when its id is taken.
    pub(crate) fn prepend(&mut self, record: Record) -> Result<(), Record> {
        if self.contains(&record.id) {
            return Err(record);
        }
        self.records.insert(0, record);
        Ok(())
    }

    /// Replaces title/description in place; `None` when `id` is unknown.
    pub(crate) fn apply_draft(&mut self, id: &RecordId, draft: &RecordDraft) -> Option<&Record> {
        let record = self.records.iter_mut().find(|record| &record.id == id)?;
        record.apply_draft(draft);
        Some(record)
    }

    pub(crate) fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let index = self.records.iter().position(|record| &record.id == id)?;
        Some(self.records.remove(index))
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }
}

/// Record currently being revised through the update path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: RecordId,
    /// Current values handed to the edit form.
    pub draft: RecordDraft,
}

/// Collection plus edit marker, shared by every controller variant.
#[derive(Debug, Clone, Default)]
pub struct StoreSession {
    list: RecordList,
    editing: Option<EditSession>,
}

impl StoreSession {
    pub fn list(&self) -> &RecordList {
        &self.list
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Enters edit mode for `id`, returning `None` when the id is unknown.
    pub fn begin_edit(&mut self, id: &RecordId) -> Option<&RecordDraft> {
        let draft = self.list.get(id)?.to_draft();
        self.editing = Some(EditSession {
            id: id.clone(),
            draft,
        });
        self.editing.as_ref().map(|session| &session.draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Swaps in a new collection and drops a dangling edit marker.
    pub(crate) fn replace_list(&mut self, list: RecordList) {
        self.list = list;
        let dangling = self
            .editing
            .as_ref()
            .is_some_and(|session| !self.list.contains(&session.id));
        if dangling {
            self.editing = None;
        }
    }

    /// Leaves edit mode if `id` was the record being edited.
    pub(crate) fn finish_edit_of(&mut self, id: &RecordId) {
        if self.editing.as_ref().is_some_and(|session| &session.id == id) {
            self.editing = None;
        }
    }
}
