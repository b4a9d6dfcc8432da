//! Severity and complexity evaluations: scored once, stored once, never overwritten.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Evaluation, EvaluationId, EvaluationKey, EvaluationKind, EvaluationSubmission,
    EvaluationSummary,
};
pub use repository::{EvaluationStore, EvaluationStoreError, InMemoryEvaluationStore};
pub use router::evaluation_router;
pub use service::{EvaluationLedger, LedgerError};
