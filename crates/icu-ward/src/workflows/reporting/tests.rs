use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use super::{reporting_router, ReportingState};
use crate::workflows::patients::{Actor, Role, Rut};
use crate::workflows::procedures::{
    Discipline, InMemoryProcedureStore, ProcedureDraft, ProcedureService, Shift,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date")
}

fn nurse(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        name: format!("Nurse {id}"),
        role: Role::Clinician,
    }
}

fn wound_care(duration: &str, day: u32, shift: Shift) -> ProcedureDraft {
    ProcedureDraft {
        discipline: Discipline::Nursing,
        name: "wound_care".to_string(),
        duration: duration.to_string(),
        date: date(day),
        shift: Some(shift),
        patient_rut: Some(Rut::parse("12345678-5").expect("valid rut")),
        observations: None,
    }
}

fn seeded_router() -> axum::Router {
    let service = ProcedureService::new(Arc::new(InMemoryProcedureStore::default()));
    let ana = nurse("n-1");
    let luis = nurse("n-2");
    for (draft, actor) in [
        (wound_care("08:30", 4, Shift::Day), &ana),
        (wound_care("01:45", 4, Shift::Day), &ana),
        (wound_care("00:30", 4, Shift::Night), &ana),
        (wound_care("00:20", 5, Shift::Night), &luis),
    ] {
        service.append(draft, actor).expect("stored");
    }
    reporting_router(Arc::new(ReportingState::new(Arc::new(service), 30)))
}

async fn get(router: axum::Router, uri: &str) -> Response {
    router
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

async fn read_json(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}

#[tokio::test]
async fn groups_route_sums_shift_totals() {
    let response = get(seeded_router(), "/api/v1/procedures/groups").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let groups = body.as_array().expect("groups");

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["date"], "2024-03-05");
    assert_eq!(groups[1]["shift"], "day");
    assert_eq!(groups[1]["total_duration_minutes"], 615);
    assert_eq!(groups[1]["total_duration_label"], "10h 15m");
    assert_eq!(groups[1]["author_name"], "Nurse n-1");
}

#[tokio::test]
async fn daily_grouping_merges_shifts() {
    let response = get(
        seeded_router(),
        "/api/v1/procedures/groups?by=day&author_id=n-1",
    )
    .await;
    let body = read_json(response).await;
    let groups = body.as_array().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["count"], 3);
    assert_eq!(groups[0]["total_duration_label"], "10h 45m");
}

#[tokio::test]
async fn metrics_route_uses_requested_window() {
    let response = get(seeded_router(), "/api/v1/metrics?days=1&today=2024-03-04").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["total_time_label"], "10h 45m");
    assert_eq!(body["per_shift_average"]["nursing"]["day"], 2.0);
    assert_eq!(body["per_shift_average"]["nursing"]["night"], 1.0);
    assert_eq!(body["window"]["from"], "2024-03-04");

    let wide = read_json(get(seeded_router(), "/api/v1/metrics?today=2024-03-05").await).await;
    assert_eq!(wide["total_count"], 4);
    assert_eq!(wide["per_day_average"], 2.0);
}

#[tokio::test]
async fn metrics_route_rejects_empty_window() {
    let response = get(seeded_router(), "/api/v1/metrics?days=0").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn report_route_serves_csv() {
    let response = get(
        seeded_router(),
        "/api/v1/procedures/report.csv?date_from=2024-03-04&date_to=2024-03-04",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );

    let csv = String::from_utf8(read_body(response).await).expect("utf8");
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Date,Shift,Discipline"));
    assert_eq!(lines[1], "2024-03-04,day,nursing,n-1,Nurse n-1,2,2,615,10h 15m");
    assert_eq!(lines[2], "2024-03-04,night,nursing,n-1,Nurse n-1,1,1,30,30m");
}

#[tokio::test]
async fn report_route_keeps_the_header_for_an_empty_range() {
    let response = get(
        seeded_router(),
        "/api/v1/procedures/report.csv?date_from=2023-01-01&date_to=2023-01-31",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let csv = String::from_utf8(read_body(response).await).expect("utf8");
    assert_eq!(
        csv,
        "Date,Shift,Discipline,Author ID,Author,Procedures,With Patient,Total Minutes,Total Time\n"
    );
}
