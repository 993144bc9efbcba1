// rest/routes/voice.rs — Voice recordings.
//
// Audio arrives and leaves as base64 JSON; decoded WAV bytes live in the
// blob store and only row metadata is kept in SQLite. A recording with a
// transcription is gated through the language detector the same way text
// translation is, and an accepted transcription with no translation gets
// one from the engine automatically.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use super::{bad_request, internal_error, not_found, ApiError};
use crate::auth::Claims;
use crate::rest::routes::translate::detection_json;
use crate::AppContext;

#[derive(Deserialize)]
pub struct SaveRequest {
    pub audio_data: Option<String>,
    #[serde(default)]
    pub duration: f64,
    pub language: Option<String>,
    pub transcription: Option<String>,
    pub translation: Option<String>,
}

pub async fn save(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<SaveRequest>,
) -> Result<Json<Value>, ApiError> {
    let audio_b64 = match body.audio_data.as_deref() {
        Some(a) if !a.is_empty() => a,
        _ => return Err(bad_request("Audio data is required")),
    };
    let audio_bytes = BASE64
        .decode(audio_b64)
        .map_err(|_| bad_request("Invalid audio data format"))?;

    let language = body.language.unwrap_or_else(|| "Somali".to_string());
    let transcription = body.transcription.unwrap_or_default();

    // A transcribed recording must actually be Somali speech.
    if !transcription.trim().is_empty() {
        let detection = ctx.detector.detect(&transcription).await;
        let accept = ctx.config.detector.accept_confidence;
        if !detection.is_somali() || detection.confidence < accept {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Fadlan ku hadal Somali. Hadalkaaga lama aqoonsan Af-Soomaali.",
                    "language_detection": detection_json(&detection),
                })),
            ));
        }
    }

    // Fill in a missing translation while we have the transcription in hand.
    let mut translation = body.translation.filter(|t| !t.trim().is_empty());
    if translation.is_none() && !transcription.trim().is_empty() {
        match ctx.engine.translate(&transcription).await {
            Ok(t) => translation = Some(t),
            Err(e) => warn!("auto-translation of transcription failed: {e:#}"),
        }
    }

    let row = ctx
        .storage
        .insert_recording(
            &claims.user_id,
            body.duration,
            &language,
            &transcription,
            translation.as_deref(),
        )
        .await
        .map_err(internal_error)?;
    ctx.media
        .save(&row.id, &audio_bytes)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "message": "Voice recording saved successfully",
        "id": row.id,
        "timestamp": row.timestamp,
    })))
}

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    let rows = ctx
        .storage
        .list_recordings(&claims.user_id, false)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(rows)))
}

pub async fn favorites(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    let rows = ctx
        .storage
        .list_recordings(&claims.user_id, true)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(rows)))
}

pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match ctx
        .storage
        .get_recording(&id, &claims.user_id)
        .await
        .map_err(internal_error)?
    {
        Some(row) => Ok(Json(json!(row))),
        None => Err(not_found("Recording not found")),
    }
}

/// Raw WAV bytes with download headers, for playback outside the browser app.
pub async fn audio(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if ctx
        .storage
        .get_recording(&id, &claims.user_id)
        .await
        .map_err(internal_error)?
        .is_none()
    {
        return Err(not_found("Recording not found"));
    }

    let bytes = match ctx.media.read(&id).await {
        Ok(b) => b,
        Err(_) => return Err(not_found("Audio data not found")),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=recording_{id}.wav"),
            ),
        ],
        bytes,
    ))
}

/// Base64 payload plus metadata, for in-browser playback.
pub async fn audio_data(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let Some(row) = ctx
        .storage
        .get_recording(&id, &claims.user_id)
        .await
        .map_err(internal_error)?
    else {
        return Err(not_found("Recording not found"));
    };

    let bytes = match ctx.media.read(&id).await {
        Ok(b) => b,
        Err(_) => return Err(not_found("Audio data not found")),
    };

    Ok(Json(json!({
        "audio_data": BASE64.encode(bytes),
        "recording_id": row.id,
        "duration": row.duration,
        "language": row.language,
        "transcription": row.transcription,
        "timestamp": row.timestamp,
    })))
}

pub async fn toggle_favorite(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let Some(row) = ctx
        .storage
        .get_recording(&id, &claims.user_id)
        .await
        .map_err(internal_error)?
    else {
        return Err(not_found("Recording not found"));
    };

    let flipped = !row.is_favorite;
    ctx.storage
        .set_recording_favorite(&id, &claims.user_id, flipped)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "message": "Favorite status updated",
        "is_favorite": flipped,
    })))
}

pub async fn delete_one(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = ctx
        .storage
        .delete_recording(&id, &claims.user_id)
        .await
        .map_err(internal_error)?;
    if !deleted {
        return Err(not_found("Recording not found"));
    }
    ctx.media.remove(&id).await.map_err(internal_error)?;

    Ok(Json(json!({ "message": "Voice recording deleted successfully" })))
}

pub async fn clear(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    // Blobs first so a failure leaves rows pointing at files, not orphans.
    let ids = ctx
        .storage
        .recording_ids(&claims.user_id)
        .await
        .map_err(internal_error)?;
    for id in &ids {
        ctx.media.remove(id).await.map_err(internal_error)?;
    }

    let deleted = ctx
        .storage
        .clear_recordings(&claims.user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({
        "message": format!("Deleted {deleted} recordings"),
    })))
}
