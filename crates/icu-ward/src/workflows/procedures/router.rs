use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Discipline, ProcedureDefinition, ProcedureDraft, ProcedureFilter, ProcedureId,
    ProcedurePatch, RegistroKey, Shift,
};
use super::repository::ProcedureStore;
use super::service::{ProcedureError, ProcedureService};
use crate::workflows::http::{actor_from_headers, error_response};

/// Router builder for procedure intake, correction and vocabulary lookup.
pub fn procedure_router<R>(service: Arc<ProcedureService<R>>) -> Router
where
    R: ProcedureStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/procedures",
            post(append_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/procedures/vocabulary", get(vocabulary_handler))
        .route(
            "/api/v1/procedures/groups/reschedule",
            post(reschedule_handler::<R>),
        )
        .route(
            "/api/v1/procedures/:id",
            patch(edit_handler::<R>).delete(remove_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub group: RegistroKey,
    pub new_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VocabularyQuery {
    pub discipline: Option<Discipline>,
}

#[derive(Debug, Clone, Serialize)]
struct VocabularyView {
    discipline: Discipline,
    shifts: &'static [Shift],
    procedures: &'static [ProcedureDefinition],
}

pub(crate) fn procedure_error_response(error: ProcedureError) -> Response {
    let status = match &error {
        err if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        ProcedureError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
        ProcedureError::NotFound(_) | ProcedureError::GroupNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(status, error.to_string())
}

pub(crate) async fn append_handler<R>(
    State(service): State<Arc<ProcedureService<R>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<ProcedureDraft>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.append(draft, &actor) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(error) => procedure_error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ProcedureService<R>>>,
    Query(filter): Query<ProcedureFilter>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    match service.list(&filter) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => procedure_error_response(error),
    }
}

pub(crate) async fn edit_handler<R>(
    State(service): State<Arc<ProcedureService<R>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    axum::Json(patch): axum::Json<ProcedurePatch>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.edit(ProcedureId(id), patch, &actor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => procedure_error_response(error),
    }
}

pub(crate) async fn remove_handler<R>(
    State(service): State<Arc<ProcedureService<R>>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response
where
    R: ProcedureStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.remove(ProcedureId(id), &actor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => procedure_error_response(error),
    }
}

pub(crate) async fn reschedule_handler<R>(
    State(service): State<Arc<ProcedureService<R>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RescheduleRequest>,
) -> Response
where
    R: ProcedureStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.reschedule_group(&request.group, request.new_date, &actor) {
        Ok(moved) => {
            let ids: Vec<_> = moved.iter().map(|record| record.id).collect();
            let payload = json!({
                "new_date": request.new_date,
                "moved": ids.len(),
                "record_ids": ids,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => procedure_error_response(error),
    }
}

pub(crate) async fn vocabulary_handler(Query(query): Query<VocabularyQuery>) -> Response {
    let disciplines: Vec<Discipline> = match query.discipline {
        Some(discipline) => vec![discipline],
        None => Discipline::ordered().to_vec(),
    };
    let views: Vec<_> = disciplines
        .into_iter()
        .map(|discipline| VocabularyView {
            discipline,
            shifts: discipline.shifts(),
            procedures: discipline.vocabulary(),
        })
        .collect();
    (StatusCode::OK, axum::Json(views)).into_response()
}
