//! Append-mostly log of procedures performed by ward staff.

pub mod domain;
pub mod duration;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Discipline, NewProcedure, ProcedureAmendment, ProcedureDefinition, ProcedureDraft,
    ProcedureFilter, ProcedureId, ProcedurePatch, ProcedureRecord, ProcedureView, RegistroKey,
    Shift,
};
pub use duration::{format_minutes, parse_hhmm, DurationError, ProcedureDuration};
pub use repository::{AmendError, InMemoryProcedureStore, ProcedureStore, StoreError};
pub use router::{procedure_router, RescheduleRequest};
pub use service::{ProcedureError, ProcedureService};
