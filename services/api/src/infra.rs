use chrono::NaiveDate;
use icu_ward::config::WardConfig;
use icu_ward::error::AppError;
use icu_ward::workflows::{
    EvaluationLedger, InMemoryEvaluationStore, InMemoryPatientDirectory, InMemoryProcedureStore,
    ProcedureService, ReportingState,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type WardLedger = EvaluationLedger<InMemoryEvaluationStore, InMemoryPatientDirectory>;
pub(crate) type WardProcedures = ProcedureService<InMemoryProcedureStore>;

/// The ward's services wired to process-local stores.
pub(crate) struct WardServices {
    pub(crate) ledger: Arc<WardLedger>,
    pub(crate) procedures: Arc<WardProcedures>,
    pub(crate) reporting: Arc<ReportingState<InMemoryProcedureStore>>,
}

impl WardServices {
    pub(crate) fn in_memory(config: &WardConfig) -> Result<Self, AppError> {
        let patients = match &config.patient_seed {
            Some(path) => InMemoryPatientDirectory::from_path(path)?,
            None => {
                warn!("ICU_PATIENT_SEED not set; patient directory starts empty");
                InMemoryPatientDirectory::default()
            }
        };
        Ok(Self::with_directory(patients, config.metrics_window_days))
    }

    pub(crate) fn with_directory(
        patients: InMemoryPatientDirectory,
        metrics_window_days: u32,
    ) -> Self {
        let ledger = Arc::new(EvaluationLedger::new(
            Arc::new(InMemoryEvaluationStore::default()),
            Arc::new(patients),
        ));
        let procedures = Arc::new(ProcedureService::new(Arc::new(
            InMemoryProcedureStore::default(),
        )));
        let reporting = Arc::new(ReportingState::new(
            procedures.clone(),
            metrics_window_days,
        ));

        Self {
            ledger,
            procedures,
            reporting,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
