use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info};

use super::domain::{
    Discipline, NewProcedure, ProcedureAmendment, ProcedureDefinition, ProcedureDraft,
    ProcedureFilter, ProcedureId, ProcedurePatch, ProcedureRecord, RegistroKey, Shift,
};
use super::duration::{DurationError, ProcedureDuration};
use super::repository::{AmendError, ProcedureStore, StoreError};
use crate::workflows::patients::{Actor, Rut};

/// Appends, edits and reschedules procedure records on behalf of ward staff.
pub struct ProcedureService<R> {
    store: Arc<R>,
}

impl<R> ProcedureService<R>
where
    R: ProcedureStore + 'static,
{
    pub fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    pub fn append(
        &self,
        draft: ProcedureDraft,
        actor: &Actor,
    ) -> Result<ProcedureRecord, ProcedureError> {
        let discipline = draft.discipline;
        check_shift(discipline, draft.shift)?;
        check_procedure(discipline, &draft.name, draft.patient_rut.as_ref())?;
        let duration = ProcedureDuration::parse(&draft.duration).map_err(|err| {
            debug!(discipline = discipline.label(), error = %err, "procedure duration rejected");
            ProcedureError::InvalidDuration(err)
        })?;

        let procedure = NewProcedure {
            discipline,
            name: draft.name,
            duration,
            date: draft.date,
            shift: draft.shift,
            author_id: actor.id.clone(),
            author_name: actor.name.clone(),
            patient_rut: draft.patient_rut,
            observations: normalize_observations(draft.observations),
        };

        let record = self.store.insert(procedure).map_err(store_failure)?;
        info!(
            id = %record.id,
            discipline = discipline.label(),
            name = %record.name,
            date = %record.date,
            minutes = record.duration.minutes(),
            author = %record.author_id,
            "procedure recorded"
        );
        Ok(record)
    }

    /// Applies the editable fields to the record as currently stored. Date, shift and author
    /// are left to the store, so an edit never reverts a group reschedule.
    pub fn edit(
        &self,
        id: ProcedureId,
        patch: ProcedurePatch,
        actor: &Actor,
    ) -> Result<ProcedureRecord, ProcedureError> {
        self.authorized(id, actor)?;

        let duration = patch
            .duration
            .as_deref()
            .map(ProcedureDuration::parse)
            .transpose()
            .map_err(|err| {
                debug!(id = %id, error = %err, "procedure duration rejected");
                ProcedureError::InvalidDuration(err)
            })?;
        let amendment = ProcedureAmendment {
            name: patch.name,
            duration,
            patient_rut: patch.patient_rut,
            observations: patch.observations.map(normalize_observations),
        };

        let amended = self.store.amend(id, &amendment, |candidate| {
            check_procedure(
                candidate.discipline,
                &candidate.name,
                candidate.patient_rut.as_ref(),
            )
            .map(|_| ())
        });
        match amended {
            Ok(record) => {
                info!(id = %id, editor = %actor.id, "procedure edited");
                Ok(record)
            }
            Err(AmendError::Rejected(err)) => Err(err),
            Err(AmendError::Store(StoreError::NotFound)) => Err(ProcedureError::NotFound(id)),
            Err(AmendError::Store(err)) => Err(store_failure(err)),
        }
    }

    pub fn remove(&self, id: ProcedureId, actor: &Actor) -> Result<ProcedureRecord, ProcedureError> {
        self.authorized(id, actor)?;
        match self.store.remove(id) {
            Ok(record) => {
                info!(id = %id, remover = %actor.id, "procedure removed");
                Ok(record)
            }
            Err(StoreError::NotFound) => Err(ProcedureError::NotFound(id)),
            Err(err) => Err(store_failure(err)),
        }
    }

    /// Moves a whole registro group to another date. The store applies the move as one batch.
    pub fn reschedule_group(
        &self,
        key: &RegistroKey,
        new_date: NaiveDate,
        actor: &Actor,
    ) -> Result<Vec<ProcedureRecord>, ProcedureError> {
        if !actor.may_modify(&key.author_id) {
            debug!(actor = %actor.id, author = %key.author_id, "group reschedule refused");
            return Err(ProcedureError::NotAuthorized {
                actor_id: actor.id.clone(),
                author_id: key.author_id.clone(),
            });
        }

        match self.store.reschedule(key, new_date) {
            Ok(moved) => {
                info!(
                    author = %key.author_id,
                    from = %key.date,
                    to = %new_date,
                    records = moved.len(),
                    "registro group rescheduled"
                );
                Ok(moved)
            }
            Err(StoreError::NotFound) => Err(ProcedureError::GroupNotFound(key.clone())),
            Err(err) => Err(store_failure(err)),
        }
    }

    pub fn fetch(&self, id: ProcedureId) -> Result<ProcedureRecord, ProcedureError> {
        self.store
            .fetch(id)
            .map_err(store_failure)?
            .ok_or(ProcedureError::NotFound(id))
    }

    pub fn list(&self, filter: &ProcedureFilter) -> Result<Vec<ProcedureRecord>, ProcedureError> {
        self.store.list(filter).map_err(store_failure)
    }

    fn authorized(&self, id: ProcedureId, actor: &Actor) -> Result<ProcedureRecord, ProcedureError> {
        let record = self.fetch(id)?;
        if !actor.may_modify(&record.author_id) {
            debug!(id = %id, actor = %actor.id, author = %record.author_id, "modification refused");
            return Err(ProcedureError::NotAuthorized {
                actor_id: actor.id.clone(),
                author_id: record.author_id,
            });
        }
        Ok(record)
    }
}

fn check_shift(discipline: Discipline, shift: Option<Shift>) -> Result<(), ProcedureError> {
    let allowed = match shift {
        Some(shift) => discipline.shifts().contains(&shift),
        None => !discipline.tracks_shifts(),
    };
    if allowed {
        Ok(())
    } else {
        debug!(discipline = discipline.label(), ?shift, "shift does not match discipline");
        Err(ProcedureError::InvalidShift { discipline, shift })
    }
}

/// A patient attached to a unit task is kept as given; only a missing one is an error.
fn check_procedure(
    discipline: Discipline,
    name: &str,
    patient_rut: Option<&Rut>,
) -> Result<&'static ProcedureDefinition, ProcedureError> {
    let definition = discipline.definition(name).ok_or_else(|| {
        debug!(discipline = discipline.label(), name, "procedure not in vocabulary");
        ProcedureError::UnknownProcedure {
            discipline,
            name: name.to_string(),
        }
    })?;

    if definition.patient_required && patient_rut.is_none() {
        debug!(name, "procedure requires a patient");
        return Err(ProcedureError::MissingPatient {
            name: definition.key.to_string(),
        });
    }
    Ok(definition)
}

fn normalize_observations(observations: Option<String>) -> Option<String> {
    observations
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn store_failure(err: StoreError) -> ProcedureError {
    error!(error = %err, "procedure store failure");
    ProcedureError::Store(err)
}

#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("'{name}' is not a {} procedure", .discipline.label())]
    UnknownProcedure { discipline: Discipline, name: String },
    #[error("procedure '{name}' must be linked to a patient")]
    MissingPatient { name: String },
    #[error("shift {} is not valid for {}", .shift.map_or("(none)", Shift::label), .discipline.label())]
    InvalidShift {
        discipline: Discipline,
        shift: Option<Shift>,
    },
    #[error(transparent)]
    InvalidDuration(DurationError),
    #[error("{actor_id} may not modify records authored by {author_id}")]
    NotAuthorized { actor_id: String, author_id: String },
    #[error("procedure {0} not found")]
    NotFound(ProcedureId),
    #[error("no procedures recorded by {} on {}", .0.author_id, .0.date)]
    GroupNotFound(RegistroKey),
    #[error(transparent)]
    Store(StoreError),
}

impl ProcedureError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownProcedure { .. }
                | Self::MissingPatient { .. }
                | Self::InvalidShift { .. }
                | Self::InvalidDuration(_)
        )
    }
}
