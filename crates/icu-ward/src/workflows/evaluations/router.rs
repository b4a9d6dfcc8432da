use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde_json::json;

use super::domain::{EvaluationKind, EvaluationSubmission};
use super::repository::EvaluationStore;
use super::service::{EvaluationLedger, LedgerError};
use crate::workflows::http::{actor_from_headers, detailed_error_response, error_response};
use crate::workflows::patients::{PatientDirectory, Rut};

/// Router builder exposing evaluation submission, lookup and scale definitions.
pub fn evaluation_router<S, P>(ledger: Arc<EvaluationLedger<S, P>>) -> Router
where
    S: EvaluationStore + 'static,
    P: PatientDirectory + 'static,
{
    Router::new()
        .route("/api/v1/evaluations/:kind", post(submit_handler::<S, P>))
        .route(
            "/api/v1/evaluations/:kind/:rut",
            get(latest_handler::<S, P>),
        )
        .route(
            "/api/v1/evaluations/:kind/:rut/history",
            get(history_handler::<S, P>),
        )
        .route("/api/v1/scales/:kind", get(scale_handler))
        .with_state(ledger)
}

fn parse_kind(raw: &str) -> Result<EvaluationKind, Response> {
    EvaluationKind::from_label(raw).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            format!("unknown evaluation kind '{raw}'"),
        )
    })
}

fn parse_rut(raw: &str) -> Result<Rut, Response> {
    Rut::parse(raw).map_err(|err| error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))
}

pub(crate) fn ledger_error_response(error: LedgerError) -> Response {
    match error {
        LedgerError::AlreadyEvaluated(existing) => detailed_error_response(
            StatusCode::CONFLICT,
            LedgerError::AlreadyEvaluated(existing.clone()).to_string(),
            json!({ "existing": existing }),
        ),
        LedgerError::Incomplete { missing } => detailed_error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "evaluation incomplete",
            json!({ "missing": missing }),
        ),
        err @ (LedgerError::InvalidDate { .. } | LedgerError::Scoring(_)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        err @ (LedgerError::PatientNotFound(_) | LedgerError::NotFound { .. }) => {
            error_response(StatusCode::NOT_FOUND, err.to_string())
        }
        err @ (LedgerError::Directory(_) | LedgerError::Store(_)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    }
}

pub(crate) async fn submit_handler<S, P>(
    State(ledger): State<Arc<EvaluationLedger<S, P>>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<EvaluationSubmission>,
) -> Response
where
    S: EvaluationStore + 'static,
    P: PatientDirectory + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let today = Local::now().date_naive();
    match ledger.submit(kind, submission, &actor, today) {
        Ok(evaluation) => (StatusCode::CREATED, axum::Json(evaluation)).into_response(),
        Err(error) => ledger_error_response(error),
    }
}

pub(crate) async fn latest_handler<S, P>(
    State(ledger): State<Arc<EvaluationLedger<S, P>>>,
    Path((kind, rut)): Path<(String, String)>,
) -> Response
where
    S: EvaluationStore + 'static,
    P: PatientDirectory + 'static,
{
    let (kind, rut) = match (parse_kind(&kind), parse_rut(&rut)) {
        (Ok(kind), Ok(rut)) => (kind, rut),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    match ledger.latest(kind, &rut) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => ledger_error_response(error),
    }
}

pub(crate) async fn history_handler<S, P>(
    State(ledger): State<Arc<EvaluationLedger<S, P>>>,
    Path((kind, rut)): Path<(String, String)>,
) -> Response
where
    S: EvaluationStore + 'static,
    P: PatientDirectory + 'static,
{
    let (kind, rut) = match (parse_kind(&kind), parse_rut(&rut)) {
        (Ok(kind), Ok(rut)) => (kind, rut),
        (Err(response), _) | (_, Err(response)) => return response,
    };

    match ledger.history(kind, &rut) {
        Ok(evaluations) => {
            let summaries: Vec<_> = evaluations.iter().map(|row| row.summary()).collect();
            (StatusCode::OK, axum::Json(summaries)).into_response()
        }
        Err(error) => ledger_error_response(error),
    }
}

pub(crate) async fn scale_handler(Path(kind): Path<String>) -> Response {
    match parse_kind(&kind) {
        Ok(kind) => {
            let scale = kind.scale();
            let payload = json!({
                "kind": kind,
                "scale": scale,
                "required": scale.required_variables().collect::<Vec<_>>(),
                "max_total": scale.max_total(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(response) => response,
    }
}
