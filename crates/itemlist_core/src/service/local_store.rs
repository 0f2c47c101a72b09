//! Snapshot-backed record store controller.
//!
//! # Responsibility
//! - Mint ids and `createdAt` locally and keep the whole collection
//!   mirrored into a `SnapshotStore`.
//!
//! # Invariants
//! - Every mutation computes the next collection, writes it, then swaps it
//!   in; `WritePolicy` decides whether a failed write still swaps.
//! - A failed or corrupt load leaves an empty collection, never an error.

use crate::clock::{Clock, SystemClock};
use crate::config::WritePolicy;
use crate::identity::{IdGenerator, UuidIdGenerator};
use crate::model::record::{Record, RecordDraft, RecordId};
use crate::repo::snapshot_store::SnapshotStore;
use crate::service::controller::{ControllerError, ControllerResult, RecordController};
use crate::service::session::{RecordList, StoreSession};
use log::{error, info, warn};
use std::sync::Arc;

const MAX_ID_ATTEMPTS: usize = 8;

/// Controller whose in-memory collection is the source of truth.
pub struct LocalRecordStore<S: SnapshotStore> {
    store: S,
    ids: Box<dyn IdGenerator + Send>,
    clock: Arc<dyn Clock>,
    write_policy: WritePolicy,
    session: StoreSession,
    dirty: bool,
}

impl<S: SnapshotStore> LocalRecordStore<S> {
    /// Uses UUID ids, the system clock and best-effort writes.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: Box::new(UuidIdGenerator),
            clock: Arc::new(SystemClock),
            write_policy: WritePolicy::default(),
            session: StoreSession::default(),
            dirty: false,
        }
    }

    pub fn with_id_generator(self, ids: impl IdGenerator + Send + 'static) -> Self {
        self.with_boxed_id_generator(Box::new(ids))
    }

    pub fn with_boxed_id_generator(mut self, ids: Box<dyn IdGenerator + Send>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    /// True when the last write failed under `WritePolicy::BestEffort`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn fresh_id(&mut self) -> ControllerResult<RecordId> {
        let mut candidate = self.ids.next_id();
        for _ in 1..MAX_ID_ATTEMPTS {
            if !self.session.list().contains(&candidate) {
                return Ok(candidate);
            }
            candidate = self.ids.next_id();
        }
        if self.session.list().contains(&candidate) {
            warn!("event=record_create module=service status=error error_code=id_collision id={candidate}");
            return Err(ControllerError::IdCollision(candidate));
        }
        Ok(candidate)
    }

    fn commit(&mut self, event: &'static str, next: RecordList) -> ControllerResult<()> {
        match self.store.persist_all(next.as_slice()) {
            Ok(()) => {
                self.dirty = false;
                self.session.replace_list(next);
                Ok(())
            }
            Err(err) if self.write_policy == WritePolicy::BestEffort => {
                warn!(
                    "event={event} module=service status=degraded error_code={} error={err}",
                    err.code()
                );
                self.dirty = true;
                self.session.replace_list(next);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={event} module=service status=error error_code={} error={err}",
                    err.code()
                );
                Err(err.into())
            }
        }
    }
}

impl<S: SnapshotStore> RecordController for LocalRecordStore<S> {
    fn load(&mut self) -> usize {
        let list = match self.store.fetch_all() {
            Ok(records) => RecordList::from_loaded(records),
            Err(err) => {
                warn!(
                    "event=records_load module=service status=degraded error_code={} error={err}",
                    err.code()
                );
                RecordList::default()
            }
        };
        self.dirty = false;
        self.session.replace_list(list);
        info!(
            "event=records_load module=service status=ok count={}",
            self.session.list().len()
        );
        self.session.list().len()
    }

    fn create(&mut self, title: &str, description: Option<&str>) -> ControllerResult<Record> {
        let draft = RecordDraft::new(title, description)?;
        let id = self.fresh_id()?;
        let record = Record::new(id, draft, self.clock.now());

        let mut next = self.session.list().clone();
        next.prepend(record.clone())
            .map_err(|rejected| ControllerError::IdCollision(rejected.id))?;
        self.commit("record_create", next)?;
        self.session.cancel_edit();

        info!(
            "event=record_create module=service status=ok id={} count={}",
            record.id,
            self.session.list().len()
        );
        Ok(record)
    }

    fn update(
        &mut self,
        id: &RecordId,
        title: &str,
        description: Option<&str>,
    ) -> ControllerResult<Record> {
        if !self.session.list().contains(id) {
            return Err(ControllerError::RecordNotFound(id.clone()));
        }
        let draft = RecordDraft::new(title, description)?;

        let mut next = self.session.list().clone();
        let updated = next
            .apply_draft(id, &draft)
            .cloned()
            .ok_or_else(|| ControllerError::RecordNotFound(id.clone()))?;
        self.commit("record_update", next)?;
        self.session.finish_edit_of(id);

        info!("event=record_update module=service status=ok id={id}");
        Ok(updated)
    }

    fn delete(&mut self, id: &RecordId) -> ControllerResult<bool> {
        if !self.session.list().contains(id) {
            return Ok(false);
        }
        let mut next = self.session.list().clone();
        next.remove(id);
        self.commit("record_delete", next)?;

        info!(
            "event=record_delete module=service status=ok id={id} count={}",
            self.session.list().len()
        );
        Ok(true)
    }

    fn clear_all(&mut self) -> ControllerResult<usize> {
        let removed = self.session.list().len();
        self.commit("records_clear", RecordList::default())?;
        self.session.cancel_edit();

        info!("event=records_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    fn session(&self) -> &StoreSession {
        &self.session
    }

    fn session_mut(&mut self) -> &mut StoreSession {
        &mut self.session
    }
}
