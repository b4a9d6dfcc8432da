pub mod directory;
pub mod evaluations;
pub mod http;
pub mod patients;
pub mod procedures;
pub mod reporting;
pub mod scoring;

pub use directory::{InMemoryPatientDirectory, PatientSeedError};
pub use evaluations::{EvaluationKind, EvaluationLedger, InMemoryEvaluationStore};
pub use patients::{Actor, PatientDirectory, PatientSnapshot, Role, Rut};
pub use procedures::{InMemoryProcedureStore, ProcedureService};
pub use reporting::ReportingState;
