//! Registro groups, shift metrics and the exported shift report. Everything here is derived
//! from the procedure records on each read.

pub mod export;
pub mod grouping;
pub mod metrics;
pub mod router;

#[cfg(test)]
mod tests;

pub use export::{
    render_shift_report, write_shift_report, ReportExportError, SHIFT_REPORT_HEADER,
};
pub use grouping::{group_by_day, group_by_shift, RegistroGroup};
pub use metrics::{metrics, MetricsWindow, ProcedureTally, WardMetrics};
pub use router::{reporting_router, Grouping, ReportingState};
