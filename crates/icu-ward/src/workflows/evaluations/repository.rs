use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{Evaluation, EvaluationKey, EvaluationKind};
use crate::workflows::patients::Rut;

/// Storage abstraction for evaluations.
///
/// `insert_unique` is the only write: implementations must check the uniqueness key and
/// insert under one atomic step (a unique index, or a single lock acquisition) so that racing
/// submissions cannot both succeed.
pub trait EvaluationStore: Send + Sync {
    fn insert_unique(&self, evaluation: Evaluation) -> Result<Evaluation, EvaluationStoreError>;
    /// Evaluations of one kind for a patient, oldest evaluation date first.
    fn for_patient(
        &self,
        kind: EvaluationKind,
        patient_rut: &Rut,
    ) -> Result<Vec<Evaluation>, EvaluationStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationStoreError {
    #[error("an evaluation already occupies this slot")]
    Conflict(Box<Evaluation>),
    #[error("evaluation store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
struct EvaluationTable {
    rows: Vec<Evaluation>,
    by_key: HashMap<EvaluationKey, usize>,
}

/// Process-local store; the mutex makes check-and-insert one critical section.
#[derive(Default)]
pub struct InMemoryEvaluationStore {
    table: Mutex<EvaluationTable>,
}

impl InMemoryEvaluationStore {
    fn lock(&self) -> Result<MutexGuard<'_, EvaluationTable>, EvaluationStoreError> {
        self.table
            .lock()
            .map_err(|_| EvaluationStoreError::Unavailable("evaluation table poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|table| table.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EvaluationStore for InMemoryEvaluationStore {
    fn insert_unique(&self, evaluation: Evaluation) -> Result<Evaluation, EvaluationStoreError> {
        let mut table = self.lock()?;
        let key = evaluation.key();
        if let Some(&index) = table.by_key.get(&key) {
            return Err(EvaluationStoreError::Conflict(Box::new(
                table.rows[index].clone(),
            )));
        }

        let index = table.rows.len();
        table.rows.push(evaluation.clone());
        table.by_key.insert(key, index);
        Ok(evaluation)
    }

    fn for_patient(
        &self,
        kind: EvaluationKind,
        patient_rut: &Rut,
    ) -> Result<Vec<Evaluation>, EvaluationStoreError> {
        let table = self.lock()?;
        let mut matches: Vec<Evaluation> = table
            .rows
            .iter()
            .filter(|row| row.kind == kind && &row.patient_rut == patient_rut)
            .cloned()
            .collect();
        matches.sort_by_key(|row| row.evaluation_date);
        Ok(matches)
    }
}
