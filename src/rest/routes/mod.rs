// rest/routes/mod.rs — REST route handlers.

pub mod admin;
pub mod favorites;
pub mod health;
pub mod history;
pub mod translate;
pub mod users;
pub mod voice;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Error half of every handler's result: a status plus an `{"error": ...}` body.
pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn internal_error(err: anyhow::Error) -> ApiError {
    tracing::error!("request failed: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

pub(crate) fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message })))
}
