use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};

use super::domain::{
    NewProcedure, ProcedureAmendment, ProcedureFilter, ProcedureId, ProcedureRecord, RegistroKey,
};

/// Storage abstraction for procedure records.
///
/// `list` returns records in insertion order; grouping relies on it to break ties.
pub trait ProcedureStore: Send + Sync {
    fn insert(&self, procedure: NewProcedure) -> Result<ProcedureRecord, StoreError>;
    fn fetch(&self, id: ProcedureId) -> Result<Option<ProcedureRecord>, StoreError>;
    /// Applies `amendment` to the stored row and keeps the result only if `check` accepts it.
    /// Reading, checking and writing happen in one step, so a concurrent reschedule is never
    /// undone by an edit.
    fn amend<E>(
        &self,
        id: ProcedureId,
        amendment: &ProcedureAmendment,
        check: impl FnOnce(&ProcedureRecord) -> Result<(), E>,
    ) -> Result<ProcedureRecord, AmendError<E>>;
    fn remove(&self, id: ProcedureId) -> Result<ProcedureRecord, StoreError>;
    fn list(&self, filter: &ProcedureFilter) -> Result<Vec<ProcedureRecord>, StoreError>;
    /// Moves every record of the group to `new_date` in one step. Either all move or none.
    fn reschedule(
        &self,
        key: &RegistroKey,
        new_date: NaiveDate,
    ) -> Result<Vec<ProcedureRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("procedure store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a refused amendment: either the check rejected the candidate row or the store failed.
#[derive(Debug)]
pub enum AmendError<E> {
    Rejected(E),
    Store(StoreError),
}

impl<E> From<StoreError> for AmendError<E> {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[derive(Default)]
struct ProcedureTable {
    next_id: u64,
    rows: BTreeMap<ProcedureId, ProcedureRecord>,
}

/// Process-local store; ids come from a counter guarded by the same mutex as the rows.
#[derive(Default)]
pub struct InMemoryProcedureStore {
    table: Mutex<ProcedureTable>,
}

impl InMemoryProcedureStore {
    fn lock(&self) -> Result<MutexGuard<'_, ProcedureTable>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("procedure table poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|table| table.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProcedureStore for InMemoryProcedureStore {
    fn insert(&self, procedure: NewProcedure) -> Result<ProcedureRecord, StoreError> {
        let mut table = self.lock()?;
        table.next_id += 1;
        let id = ProcedureId(table.next_id);
        let record = procedure.into_record(id, Utc::now());
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ProcedureId) -> Result<Option<ProcedureRecord>, StoreError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn amend<E>(
        &self,
        id: ProcedureId,
        amendment: &ProcedureAmendment,
        check: impl FnOnce(&ProcedureRecord) -> Result<(), E>,
    ) -> Result<ProcedureRecord, AmendError<E>> {
        let mut table = self.lock()?;
        let existing = table.rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        let mut candidate = existing.clone();
        amendment.apply_to(&mut candidate);
        check(&candidate).map_err(AmendError::Rejected)?;
        *existing = candidate.clone();
        Ok(candidate)
    }

    fn remove(&self, id: ProcedureId) -> Result<ProcedureRecord, StoreError> {
        self.lock()?.rows.remove(&id).ok_or(StoreError::NotFound)
    }

    fn list(&self, filter: &ProcedureFilter) -> Result<Vec<ProcedureRecord>, StoreError> {
        Ok(self
            .lock()?
            .rows
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn reschedule(
        &self,
        key: &RegistroKey,
        new_date: NaiveDate,
    ) -> Result<Vec<ProcedureRecord>, StoreError> {
        let mut table = self.lock()?;
        let mut moved = Vec::new();
        for record in table.rows.values_mut() {
            if record.registro_key() == *key {
                record.date = new_date;
                moved.push(record.clone());
            }
        }

        if moved.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(moved)
    }
}
