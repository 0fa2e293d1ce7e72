use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Render the JSON error body shared by every service: `{kind, message}`.
///
/// Logging is left to the caller. Service error enums log 500s only, since
/// tower-http's TraceLayer already records method/uri/status for all requests.
pub fn error_response(status: StatusCode, kind: &'static str, message: String) -> Response {
    let body = serde_json::json!({
        "kind": kind,
        "message": message,
    });
    (status, axum::Json(body)).into_response()
}
