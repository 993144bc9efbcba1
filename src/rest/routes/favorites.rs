// rest/routes/favorites.rs — Saved translations.
//
// A favorite is its own row: adding one by history id copies the history
// row's texts and back-links it, so the favorite survives history clears.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{bad_request, internal_error, not_found, ApiError};
use crate::auth::Claims;
use crate::AppContext;

#[derive(Deserialize)]
pub struct AddRequest {
    pub id: Option<String>,
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
}

pub async fn add(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<AddRequest>,
) -> Result<Json<Value>, ApiError> {
    // By-id form: copy the caller's own history row and flag it.
    if let Some(hist_id) = &body.id {
        if let Some(row) = ctx
            .storage
            .get_translation(hist_id, &claims.user_id)
            .await
            .map_err(internal_error)?
        {
            let fav = ctx
                .storage
                .insert_favorite(
                    &claims.user_id,
                    &row.original_text,
                    &row.translated_text,
                    Some(&row.id),
                )
                .await
                .map_err(internal_error)?;
            ctx.storage
                .set_translation_favorite(&row.id, &claims.user_id, true)
                .await
                .map_err(internal_error)?;
            return Ok(Json(json!({ "message": "ok", "id": fav.id })));
        }
    }

    // Direct form: both texts supplied inline.
    let (original, translated) = match (body.original_text, body.translated_text) {
        (Some(o), Some(t)) if !o.is_empty() && !t.is_empty() => (o, t),
        _ => return Err(bad_request("Missing original_text/translated_text")),
    };

    let fav = ctx
        .storage
        .insert_favorite(&claims.user_id, &original, &translated, None)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "message": "ok", "id": fav.id })))
}

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    let rows = ctx
        .storage
        .list_favorites(&claims.user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(rows)))
}

pub async fn delete_one(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = ctx
        .storage
        .delete_favorite(&id, &claims.user_id)
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
        .clear_favorites(&claims.user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "message": "cleared" })))
}
