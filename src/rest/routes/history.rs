// rest/routes/history.rs — Per-user translation history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{bad_request, internal_error, not_found, ApiError};
use crate::auth::Claims;
use crate::AppContext;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddRequest {
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
}

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(20).clamp(1, 100);

    let rows = ctx
        .storage
        .list_translations(&claims.user_id, page, limit)
        .await
        .map_err(internal_error)?;
    let total = ctx
        .storage
        .count_translations(&claims.user_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "translations": rows,
        "total": total,
        "page": page,
        "limit": limit,
        "pages": (total + limit - 1) / limit,
    })))
}

pub async fn add(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<AddRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (original, translated) = match (body.original_text, body.translated_text) {
        (Some(o), Some(t)) if !o.is_empty() && !t.is_empty() => (o, t),
        _ => return Err(bad_request("Missing original_text or translated_text")),
    };

    // Manual entries carry no detection verdict.
    let row = ctx
        .storage
        .insert_translation(Some(&claims.user_id), &original, &translated, None)
        .await
        .map_err(internal_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Translation added to history",
            "translation": row,
        })),
    ))
}

pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match ctx
        .storage
        .get_translation(&id, &claims.user_id)
        .await
        .map_err(internal_error)?
    {
        Some(row) => Ok(Json(json!(row))),
        None => Err(not_found("Not found")),
    }
}

pub async fn delete_one(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = ctx
        .storage
        .delete_translation(&id, &claims.user_id)
        .await
        .map_err(internal_error)?;
    if !deleted {
        return Err(not_found("Not found"));
    }
    Ok(Json(json!({ "message": "deleted" })))
}

pub async fn clear(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    ctx.storage
        .clear_translations(&claims.user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "message": "cleared" })))
}
