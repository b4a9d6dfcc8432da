//! Intensive-care ward engine.
//!
//! Range-bucketed clinical scoring (APACHE II severity and kinesiology complexity), an
//! evaluation ledger that never overwrites a clinical record, and the procedure store whose
//! records are grouped into per-shift registros for reporting and dashboard metrics.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
