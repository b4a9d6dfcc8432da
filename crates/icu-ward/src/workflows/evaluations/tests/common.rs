use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::evaluations::{
    Evaluation, EvaluationKind, EvaluationLedger, EvaluationStore, EvaluationStoreError,
    EvaluationSubmission, InMemoryEvaluationStore,
};
use crate::workflows::patients::{
    Actor, DirectoryError, PatientDirectory, PatientSnapshot, Role, Rut,
};
use crate::workflows::scoring::ComponentSelection;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn rut() -> Rut {
    Rut::parse("12.345.678-5").expect("valid rut")
}

pub(super) fn admitted_on() -> NaiveDate {
    date(2024, 1, 10)
}

pub(super) fn today() -> NaiveDate {
    date(2024, 1, 25)
}

pub(super) fn patient() -> PatientSnapshot {
    PatientSnapshot {
        rut: rut(),
        bed_number: Some(4),
        admission_date: admitted_on(),
        discharge_date: None,
        birth_date: date(1956, 3, 2),
    }
}

pub(super) fn clinician(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        name: format!("Dr. {id}"),
        role: Role::Clinician,
    }
}

fn selections(entries: &[(&str, ComponentSelection)]) -> BTreeMap<String, ComponentSelection> {
    entries
        .iter()
        .map(|(variable, selection)| (variable.to_string(), selection.clone()))
        .collect()
}

fn measurement(value: f64) -> ComponentSelection {
    ComponentSelection::Measurement(value)
}

fn choice(id: &str) -> ComponentSelection {
    ComponentSelection::Choice(id.to_string())
}

/// Twelve points for a 67 year old: heart rate 3, sodium 2, GCS 2, age 5.
pub(super) fn severity_submission(evaluation_date: NaiveDate) -> EvaluationSubmission {
    EvaluationSubmission {
        patient_rut: rut(),
        evaluation_date,
        selections: selections(&[
            ("temperature", measurement(37.1)),
            ("mean_arterial_pressure", measurement(82.0)),
            ("heart_rate", measurement(150.0)),
            ("respiratory_rate", measurement(18.0)),
            ("oxygenation", choice("pao2_gt_70")),
            ("arterial_ph", measurement(7.41)),
            ("sodium", measurement(158.0)),
            ("potassium", measurement(4.2)),
            ("creatinine", measurement(0.9)),
            ("hematocrit", measurement(38.0)),
            ("white_blood_cells", measurement(9.5)),
            ("glasgow_coma_scale", measurement(13.0)),
            ("chronic_health", choice("none")),
        ]),
    }
}

pub(super) fn complexity_submission(evaluation_date: NaiveDate) -> EvaluationSubmission {
    EvaluationSubmission {
        patient_rut: rut(),
        evaluation_date,
        selections: selections(&[
            ("ventilatory_support", choice("invasive_full")),
            ("airway", choice("endotracheal_tube")),
            ("secretions", choice("moderate_assisted")),
            ("oxygen_requirement", choice("fio2_40_60")),
            ("mobility", choice("bed_passive")),
            ("consciousness", choice("sedated_responsive")),
        ]),
    }
}

#[derive(Default)]
pub(super) struct MemoryPatients {
    patients: Mutex<HashMap<Rut, PatientSnapshot>>,
}

impl MemoryPatients {
    pub(super) fn with(patient: PatientSnapshot) -> Self {
        let directory = Self::default();
        directory
            .patients
            .lock()
            .expect("patients mutex poisoned")
            .insert(patient.rut.clone(), patient);
        directory
    }
}

impl PatientDirectory for MemoryPatients {
    fn patient(&self, rut: &Rut) -> Result<Option<PatientSnapshot>, DirectoryError> {
        Ok(self
            .patients
            .lock()
            .expect("patients mutex poisoned")
            .get(rut)
            .cloned())
    }
}

pub(super) struct UnavailableStore;

impl EvaluationStore for UnavailableStore {
    fn insert_unique(&self, _evaluation: Evaluation) -> Result<Evaluation, EvaluationStoreError> {
        Err(EvaluationStoreError::Unavailable("database offline".to_string()))
    }

    fn for_patient(
        &self,
        _kind: EvaluationKind,
        _patient_rut: &Rut,
    ) -> Result<Vec<Evaluation>, EvaluationStoreError> {
        Err(EvaluationStoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryLedger = EvaluationLedger<InMemoryEvaluationStore, MemoryPatients>;

pub(super) fn build_ledger() -> (MemoryLedger, Arc<InMemoryEvaluationStore>) {
    let store = Arc::new(InMemoryEvaluationStore::default());
    let patients = Arc::new(MemoryPatients::with(patient()));
    (EvaluationLedger::new(store.clone(), patients), store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
