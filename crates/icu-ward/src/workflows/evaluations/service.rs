use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info};

use super::domain::{
    Evaluation, EvaluationId, EvaluationKind, EvaluationSubmission, EvaluationSummary,
};
use super::repository::{EvaluationStore, EvaluationStoreError};
use crate::workflows::patients::{Actor, DirectoryError, PatientDirectory, PatientSnapshot, Rut};
use crate::workflows::scoring::severity::AGE;
use crate::workflows::scoring::{Scale, ScoringError};

/// Records clinical evaluations and refuses to overwrite one that already exists.
pub struct EvaluationLedger<S, P> {
    store: Arc<S>,
    patients: Arc<P>,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

fn derived_measurements(
    scale: &Scale,
    patient: &PatientSnapshot,
    evaluation_date: NaiveDate,
) -> BTreeMap<&'static str, f64> {
    let mut derived = BTreeMap::new();
    if scale.derived.contains(&AGE) {
        derived.insert(AGE, f64::from(patient.age_on(evaluation_date)));
    }
    derived
}

impl<S, P> EvaluationLedger<S, P>
where
    S: EvaluationStore + 'static,
    P: PatientDirectory + 'static,
{
    pub fn new(store: Arc<S>, patients: Arc<P>) -> Self {
        Self { store, patients }
    }

    /// Validate, score and store an evaluation.
    ///
    /// Order matters for what the clinician sees: an out-of-range date is reported before
    /// missing selections, and both before the uniqueness conflict.
    pub fn submit(
        &self,
        kind: EvaluationKind,
        submission: EvaluationSubmission,
        actor: &Actor,
        today: NaiveDate,
    ) -> Result<Evaluation, LedgerError> {
        let patient = self
            .patients
            .patient(&submission.patient_rut)?
            .ok_or_else(|| LedgerError::PatientNotFound(submission.patient_rut.clone()))?;

        let date = submission.evaluation_date;
        if date < patient.admission_date || date > today {
            debug!(
                kind = kind.label(),
                rut = %patient.rut,
                %date,
                "evaluation date outside admission window"
            );
            return Err(LedgerError::InvalidDate {
                date,
                admitted_on: patient.admission_date,
                today,
            });
        }

        let scale = kind.scale();
        let missing = scale.missing_variables(&submission.selections);
        if !missing.is_empty() {
            debug!(kind = kind.label(), rut = %patient.rut, ?missing, "evaluation incomplete");
            return Err(LedgerError::Incomplete { missing });
        }

        let derived = derived_measurements(scale, &patient, date);
        let card = scale.score_all(&submission.selections, &derived)?;

        let evaluation = Evaluation {
            id: next_evaluation_id(),
            kind,
            patient_rut: patient.rut.clone(),
            evaluation_date: date,
            author_id: actor.id.clone(),
            component_scores: card.components,
            total_score: card.total,
            tier: card.tier,
            created_at: Utc::now(),
        };

        match self.store.insert_unique(evaluation) {
            Ok(stored) => {
                info!(
                    id = %stored.id.0,
                    kind = kind.label(),
                    rut = %stored.patient_rut,
                    total = stored.total_score,
                    tier = %stored.tier.label,
                    "evaluation recorded"
                );
                Ok(stored)
            }
            Err(EvaluationStoreError::Conflict(existing)) => {
                debug!(
                    kind = kind.label(),
                    rut = %existing.patient_rut,
                    existing = %existing.id.0,
                    "evaluation already recorded"
                );
                Err(LedgerError::AlreadyEvaluated(existing.summary()))
            }
            Err(err) => {
                error!(kind = kind.label(), error = %err, "evaluation store failure");
                Err(LedgerError::Store(err))
            }
        }
    }

    /// Most recent evaluation of `kind` for the patient.
    pub fn latest(&self, kind: EvaluationKind, patient_rut: &Rut) -> Result<Evaluation, LedgerError> {
        self.history(kind, patient_rut)?
            .pop()
            .ok_or_else(|| LedgerError::NotFound {
                kind,
                patient_rut: patient_rut.clone(),
            })
    }

    pub fn history(
        &self,
        kind: EvaluationKind,
        patient_rut: &Rut,
    ) -> Result<Vec<Evaluation>, LedgerError> {
        self.store.for_patient(kind, patient_rut).map_err(|err| {
            error!(kind = kind.label(), error = %err, "evaluation store failure");
            LedgerError::Store(err)
        })
    }
}

/// Outcomes of a ledger operation. Everything except `Directory` and `Store` is an expected
/// validation result to show to the clinician.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("patient {0} is not registered")]
    PatientNotFound(Rut),
    #[error("evaluation date {date} must fall between admission on {admitted_on} and {today}")]
    InvalidDate {
        date: NaiveDate,
        admitted_on: NaiveDate,
        today: NaiveDate,
    },
    #[error("evaluation incomplete, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },
    #[error(transparent)]
    Scoring(ScoringError),
    #[error(
        "patient {} already has a {} evaluation from {} ({} points, {})",
        .0.patient_rut, .0.kind.label(), .0.evaluation_date, .0.total_score, .0.tier
    )]
    AlreadyEvaluated(EvaluationSummary),
    #[error("no {} evaluation recorded for {patient_rut}", .kind.label())]
    NotFound {
        kind: EvaluationKind,
        patient_rut: Rut,
    },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(EvaluationStoreError),
}

impl From<ScoringError> for LedgerError {
    fn from(value: ScoringError) -> Self {
        match value {
            ScoringError::Incomplete { missing } => Self::Incomplete { missing },
            other => Self::Scoring(other),
        }
    }
}

impl LedgerError {
    /// Validation outcomes are shown to the user and never treated as system failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Directory(_) | Self::Store(_))
    }
}
