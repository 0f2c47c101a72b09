//! Remote-collection record store controller.
//!
//! # Responsibility
//! - Forward each mutation to a `RemoteCollection` and reconcile by
//!   reloading the authoritative collection afterwards.
//!
//! # Invariants
//! - Nothing changes in memory unless the remote call succeeded.
//! - When the reconciling reload fails, the confirmed change is applied
//!   locally so memory still reflects what the remote accepted.

use crate::model::record::{Record, RecordDraft, RecordId};
use crate::repo::remote_collection::RemoteCollection;
use crate::repo::store_error::StoreError;
use crate::service::controller::{ControllerError, ControllerResult, RecordController};
use crate::service::session::{RecordList, StoreSession};
use log::{error, info, warn};

/// Controller whose remote collection is the source of truth.
pub struct RemoteRecordStore<R: RemoteCollection> {
    remote: R,
    session: StoreSession,
}

impl<R: RemoteCollection> RemoteRecordStore<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            session: StoreSession::default(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    /// Reloads from the remote; falls back to patching memory on failure.
    fn reconcile(&mut self, event: &'static str, fallback: impl FnOnce(&mut RecordList)) {
        match self.remote.fetch_all() {
            Ok(records) => self.session.replace_list(RecordList::from_loaded(records)),
            Err(err) => {
                warn!(
                    "event={event} module=service status=degraded stage=reconcile error_code={} error={err}",
                    err.code()
                );
                let mut next = self.session.list().clone();
                fallback(&mut next);
                self.session.replace_list(next);
            }
        }
    }

    /// Ids the remote currently holds; the in-memory ids when it cannot list.
    fn remote_ids(&mut self) -> Vec<RecordId> {
        match self.remote.fetch_all() {
            Ok(records) => records.into_iter().map(|record| record.id).collect(),
            Err(err) => {
                warn!(
                    "event=records_clear module=service status=degraded stage=list error_code={} error={err}",
                    err.code()
                );
                self.session
                    .list()
                    .as_slice()
                    .iter()
                    .map(|record| record.id.clone())
                    .collect()
            }
        }
    }

    fn remote_failed(event: &'static str, err: StoreError) -> ControllerError {
        error!(
            "event={event} module=service status=error error_code={} error={err}",
            err.code()
        );
        ControllerError::Persistence(err)
    }
}

impl<R: RemoteCollection> RecordController for RemoteRecordStore<R> {
    fn load(&mut self) -> usize {
        let list = match self.remote.fetch_all() {
            Ok(records) => RecordList::from_loaded(records),
            Err(err) => {
                warn!(
                    "event=records_load module=service status=degraded error_code={} error={err}",
                    err.code()
                );
                RecordList::default()
            }
        };
        self.session.replace_list(list);
        info!(
            "event=records_load module=service status=ok count={}",
            self.session.list().len()
        );
        self.session.list().len()
    }

    fn create(&mut self, title: &str, description: Option<&str>) -> ControllerResult<Record> {
        let draft = RecordDraft::new(title, description)?;
        let created = self
            .remote
            .create_remote(&draft)
            .map_err(|err| Self::remote_failed("record_create", err))?;

        let confirmed = created.clone();
        self.reconcile("record_create", move |list| {
            // A colliding id means the remote already listed it.
            let _ = list.prepend(confirmed);
        });
        self.session.cancel_edit();

        info!(
            "event=record_create module=service status=ok id={} count={}",
            created.id,
            self.session.list().len()
        );
        Ok(created)
    }

    fn update(
        &mut self,
        id: &RecordId,
        title: &str,
        description: Option<&str>,
    ) -> ControllerResult<Record> {
        let Some(current) = self.session.list().get(id).cloned() else {
            return Err(ControllerError::RecordNotFound(id.clone()));
        };
        let draft = RecordDraft::new(title, description)?;

        match self.remote.update_remote(id, &draft) {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                warn!("event=record_update module=service status=stale id={id}");
                self.reconcile("record_update", |list| {
                    list.remove(id);
                });
                return Err(ControllerError::RecordNotFound(id.clone()));
            }
            Err(err) => return Err(Self::remote_failed("record_update", err)),
        }

        self.reconcile("record_update", |list| {
            list.apply_draft(id, &draft);
        });
        self.session.finish_edit_of(id);

        let updated = self.session.list().get(id).cloned().unwrap_or_else(|| {
            let mut record = current;
            record.apply_draft(&draft);
            record
        });
        info!("event=record_update module=service status=ok id={id}");
        Ok(updated)
    }

    fn delete(&mut self, id: &RecordId) -> ControllerResult<bool> {
        if !self.session.list().contains(id) {
            return Ok(false);
        }
        self.remote
            .delete_remote(id)
            .map_err(|err| Self::remote_failed("record_delete", err))?;

        self.reconcile("record_delete", |list| {
            list.remove(id);
        });
        info!(
            "event=record_delete module=service status=ok id={id} count={}",
            self.session.list().len()
        );
        Ok(true)
    }

    fn clear_all(&mut self) -> ControllerResult<usize> {
        let ids = self.remote_ids();

        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            if let Err(err) = self.remote.delete_remote(&id) {
                // Partial progress is real on the remote; show it.
                self.reconcile("records_clear", |list| {
                    for id in &deleted {
                        list.remove(id);
                    }
                });
                return Err(Self::remote_failed("records_clear", err));
            }
            deleted.push(id);
        }

        let removed = deleted.len();
        self.reconcile("records_clear", |list| {
            list.clear();
        });
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
