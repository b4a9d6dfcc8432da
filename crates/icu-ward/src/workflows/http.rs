//! Glue shared by the ward routers.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use super::patients::{Actor, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity is asserted by the fronting gateway; this only reads what it forwarded.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let id = read(USER_ID_HEADER).ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            format!("missing {USER_ID_HEADER} header"),
        )
    })?;
    let role = match read(USER_ROLE_HEADER) {
        Some(raw) => Role::from_label(&raw).ok_or_else(|| {
            error_response(StatusCode::UNAUTHORIZED, format!("unknown role '{raw}'"))
        })?,
        None => Role::Clinician,
    };
    let name = read(USER_NAME_HEADER).unwrap_or_else(|| id.clone());

    Ok(Actor { id, name, role })
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, axum::Json(payload)).into_response()
}

/// Error body with extra structured fields merged in next to `error`.
pub fn detailed_error_response(
    status: StatusCode,
    message: impl Into<String>,
    details: Value,
) -> Response {
    let mut payload = json!({ "error": message.into() });
    if let (Value::Object(target), Value::Object(extra)) = (&mut payload, details) {
        target.extend(extra);
    }
    (status, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_actor_with_default_role() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("kine-7"));
        let Ok(actor) = actor_from_headers(&headers) else {
            panic!("actor present");
        };
        assert_eq!(actor.id, "kine-7");
        assert_eq!(actor.name, "kine-7");
        assert_eq!(actor.role, Role::Clinician);
    }

    #[test]
    fn rejects_missing_identity_and_unknown_roles() {
        let headers = HeaderMap::new();
        let response = actor_from_headers(&headers).expect_err("no identity");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-1"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("superuser"));
        let response = actor_from_headers(&headers).expect_err("bad role");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
