use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::patients::{Actor, Role, Rut};
use crate::workflows::procedures::{
    AmendError, Discipline, InMemoryProcedureStore, NewProcedure, ProcedureAmendment,
    ProcedureDraft, ProcedureFilter, ProcedureId, ProcedureRecord, ProcedureService,
    ProcedureStore, RegistroKey, Shift, StoreError,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn rut() -> Rut {
    Rut::parse("12.345.678-5").expect("valid rut")
}

pub(super) fn clinician(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        name: format!("Staff {id}"),
        role: Role::Clinician,
    }
}

pub(super) fn administrator() -> Actor {
    Actor {
        id: "admin-1".to_string(),
        name: "Unit head".to_string(),
        role: Role::Administrator,
    }
}

pub(super) fn draft(
    discipline: Discipline,
    name: &str,
    duration: &str,
    on: NaiveDate,
    shift: Option<Shift>,
) -> ProcedureDraft {
    ProcedureDraft {
        discipline,
        name: name.to_string(),
        duration: duration.to_string(),
        date: on,
        shift,
        patient_rut: Some(rut()),
        observations: None,
    }
}

pub(super) fn nursing_draft(name: &str, duration: &str, on: NaiveDate) -> ProcedureDraft {
    draft(Discipline::Nursing, name, duration, on, Some(Shift::Day))
}

pub(super) fn build_service() -> (ProcedureService<InMemoryProcedureStore>, Arc<InMemoryProcedureStore>) {
    let store = Arc::new(InMemoryProcedureStore::default());
    (ProcedureService::new(store.clone()), store)
}

pub(super) struct UnavailableStore;

impl ProcedureStore for UnavailableStore {
    fn insert(&self, _procedure: NewProcedure) -> Result<ProcedureRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ProcedureId) -> Result<Option<ProcedureRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn amend<E>(
        &self,
        _id: ProcedureId,
        _amendment: &ProcedureAmendment,
        _check: impl FnOnce(&ProcedureRecord) -> Result<(), E>,
    ) -> Result<ProcedureRecord, AmendError<E>> {
        Err(AmendError::Store(StoreError::Unavailable(
            "database offline".to_string(),
        )))
    }

    fn remove(&self, _id: ProcedureId) -> Result<ProcedureRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &ProcedureFilter) -> Result<Vec<ProcedureRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn reschedule(
        &self,
        _key: &RegistroKey,
        _new_date: NaiveDate,
    ) -> Result<Vec<ProcedureRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Moves a group to another date right after the next `fetch` has read its row, the way a
/// second request landing between an edit's read and write would.
pub(super) struct InterleavedRescheduleStore {
    inner: InMemoryProcedureStore,
    pending: Mutex<Option<(RegistroKey, NaiveDate)>>,
}

impl InterleavedRescheduleStore {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryProcedureStore::default(),
            pending: Mutex::new(None),
        }
    }

    pub(super) fn reschedule_after_next_fetch(&self, key: RegistroKey, new_date: NaiveDate) {
        *self.pending.lock().expect("pending lock") = Some((key, new_date));
    }
}

impl ProcedureStore for InterleavedRescheduleStore {
    fn insert(&self, procedure: NewProcedure) -> Result<ProcedureRecord, StoreError> {
        self.inner.insert(procedure)
    }

    fn fetch(&self, id: ProcedureId) -> Result<Option<ProcedureRecord>, StoreError> {
        let row = self.inner.fetch(id)?;
        let pending = self.pending.lock().expect("pending lock").take();
        if let Some((key, new_date)) = pending {
            self.inner.reschedule(&key, new_date)?;
        }
        Ok(row)
    }

    fn amend<E>(
        &self,
        id: ProcedureId,
        amendment: &ProcedureAmendment,
        check: impl FnOnce(&ProcedureRecord) -> Result<(), E>,
    ) -> Result<ProcedureRecord, AmendError<E>> {
        self.inner.amend(id, amendment, check)
    }

    fn remove(&self, id: ProcedureId) -> Result<ProcedureRecord, StoreError> {
        self.inner.remove(id)
    }

    fn list(&self, filter: &ProcedureFilter) -> Result<Vec<ProcedureRecord>, StoreError> {
        self.inner.list(filter)
    }

    fn reschedule(
        &self,
        key: &RegistroKey,
        new_date: NaiveDate,
    ) -> Result<Vec<ProcedureRecord>, StoreError> {
        self.inner.reschedule(key, new_date)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
