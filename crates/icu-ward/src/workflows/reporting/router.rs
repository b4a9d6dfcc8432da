use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::error;

use super::export::render_shift_report;
use super::grouping::{group_by_day, group_by_shift, RegistroGroup};
use super::metrics::{metrics, MetricsWindow};
use crate::workflows::http::error_response;
use crate::workflows::procedures::router::procedure_error_response;
use crate::workflows::procedures::{
    Discipline, ProcedureFilter, ProcedureRecord, ProcedureService, ProcedureStore, Shift,
};

/// Shared state for the read-only reporting endpoints.
pub struct ReportingState<R> {
    service: Arc<ProcedureService<R>>,
    default_window_days: u32,
}

impl<R> ReportingState<R> {
    pub fn new(service: Arc<ProcedureService<R>>, default_window_days: u32) -> Self {
        Self {
            service,
            default_window_days,
        }
    }
}

/// Router builder for registro groups, dashboard metrics and the CSV shift report.
pub fn reporting_router<R>(state: Arc<ReportingState<R>>) -> Router
where
    R: ProcedureStore + 'static,
{
    Router::new()
        .route("/api/v1/procedures/groups", get(groups_handler::<R>))
        .route("/api/v1/procedures/report.csv", get(report_handler::<R>))
        .route("/api/v1/metrics", get(metrics_handler::<R>))
        .with_state(state)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    #[default]
    Shift,
    Day,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupsQuery {
    #[serde(default)]
    pub by: Grouping,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub shift: Option<Shift>,
    pub author_id: Option<String>,
    pub discipline: Option<Discipline>,
}

impl GroupsQuery {
    fn filter(&self) -> ProcedureFilter {
        ProcedureFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            shift: self.shift,
            author_id: self.author_id.clone(),
            patient_rut: None,
            discipline: self.discipline,
        }
    }

    fn group(&self, records: &[ProcedureRecord]) -> Vec<RegistroGroup> {
        match self.by {
            Grouping::Shift => group_by_shift(records),
            Grouping::Day => group_by_day(records),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsQuery {
    pub days: Option<u32>,
    /// Last day of the window; defaults to the server's local date.
    pub today: Option<NaiveDate>,
    pub discipline: Option<Discipline>,
}

pub(crate) async fn groups_handler<R>(
    State(state): State<Arc<ReportingState<R>>>,
    Query(query): Query<GroupsQuery>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    match state.service.list(&query.filter()) {
        Ok(records) => (StatusCode::OK, axum::Json(query.group(&records))).into_response(),
        Err(error) => procedure_error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(state): State<Arc<ReportingState<R>>>,
    Query(query): Query<GroupsQuery>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    let records = match state.service.list(&query.filter()) {
        Ok(records) => records,
        Err(error) => return procedure_error_response(error),
    };

    match render_shift_report(&query.group(&records)) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "shift report export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub(crate) async fn metrics_handler<R>(
    State(state): State<Arc<ReportingState<R>>>,
    Query(query): Query<MetricsQuery>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    let days = query.days.unwrap_or(state.default_window_days);
    if days == 0 {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "metrics window must span at least one day",
        );
    }
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let window = MetricsWindow::trailing_days(today, days);

    let filter = ProcedureFilter {
        discipline: query.discipline,
        ..window.filter()
    };
    match state.service.list(&filter) {
        Ok(records) => (StatusCode::OK, axum::Json(metrics(&records, window))).into_response(),
        Err(error) => procedure_error_response(error),
    }
}
