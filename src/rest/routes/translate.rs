// rest/routes/translate.rs — Translation and language-detection endpoints.
//
// The translate endpoint only accepts Somali input: anything the detector
// does not accept is turned away with a Somali-language error and example
// sentences, so browser users see guidance instead of a bare 400.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use super::{bad_request, internal_error, ApiError};
use crate::detect::{Detection, DEFAULT_SOMALI_THRESHOLD};
use crate::rest::auth::optional_claims;
use crate::AppContext;

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct IsSomaliRequest {
    pub text: Option<String>,
    pub confidence_threshold: Option<f64>,
}

/// Missing `text` key and blank text are distinct client errors.
fn require_text(text: &Option<String>) -> Result<String, ApiError> {
    let text = text.as_deref().ok_or_else(|| bad_request("Text is required"))?;
    if text.trim().is_empty() {
        return Err(bad_request("Text cannot be empty"));
    }
    Ok(text.to_string())
}

/// Wire form of a detection verdict, shared by every endpoint that reports one.
pub(crate) fn detection_json(d: &Detection) -> Value {
    json!({
        "detected_language": d.language.code(),
        "language_confidence": d.confidence,
        "detection_method": d.method.as_str(),
        "is_somali": d.is_somali(),
        "language_name": if d.is_somali() { "Somali" } else { "Other" },
    })
}

fn rejection(d: &Detection) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Qoraalkan ma ahan Af-Soomaali. Fadlan geli qoraal Af-Soomaali ah.",
            "language_detection": detection_json(d),
            "help": {
                "message": "Tusaalooyin qoraal Af-Soomaali ah:",
                "examples": [
                    "Salaan, sidee tahay?",
                    "Waxaan rabaa inaan tago suuqa.",
                    "Mahadsanid, nabad gelyo.",
                ],
            },
        })),
    )
}

pub async fn translate(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = require_text(&body.text)?;

    let detection = ctx.detector.detect(&text).await;
    let accept = ctx.config.detector.accept_confidence;
    if !detection.is_somali() || detection.confidence < accept {
        return Err(rejection(&detection));
    }

    let translated = match ctx.engine.translate(&text).await {
        Ok(t) => t,
        Err(e) => {
            error!("translation engine failed: {e:#}");
            return Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Translation failed" })),
            ));
        }
    };

    // History is attributed when the caller presented a valid token and
    // recorded anonymously otherwise; a translate call never requires auth.
    let user_id = optional_claims(&ctx, &headers).map(|c| c.user_id);
    ctx.storage
        .insert_translation(user_id.as_deref(), &text, &translated, Some(&detection))
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "original_text": text,
        "translated_text": translated,
        "language_detection": detection_json(&detection),
    })))
}

pub async fn detect_language(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = require_text(&body.text)?;
    let detection = ctx.detector.detect(&text).await;
    Ok(Json(json!({
        "text": text,
        "language_detection": detection_json(&detection),
    })))
}

pub async fn is_somali(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<IsSomaliRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = require_text(&body.text)?;
    let threshold = body.confidence_threshold.unwrap_or(DEFAULT_SOMALI_THRESHOLD);
    let verdict = ctx.detector.is_somali(&text, threshold).await;
    Ok(Json(json!({
        "text": text,
        "is_somali": verdict,
        "confidence_threshold": threshold,
    })))
}

pub async fn analyze_text(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = require_text(&body.text)?;

    let detection = ctx.detector.detect(&text).await;
    let report = ctx.detector.word_report(&text);
    let characteristics = ctx.detector.characteristic_score(&text);
    let ratio = if report.total_words > 0 {
        report.somali_words.len() as f64 / report.total_words as f64
    } else {
        0.0
    };

    Ok(Json(json!({
        "text": text,
        "analysis": {
            "detected_language": detection.language.code(),
            "confidence": detection.confidence,
            "method": detection.method.as_str(),
            "is_somali": detection.is_somali(),
            "total_words": report.total_words,
            "somali_words_count": report.somali_words.len(),
            "somali_words_found": report.somali_words,
            "somali_characteristics_score": characteristics,
            "somali_ratio": ratio,
        },
    })))
}
