//! Translation engine seam.
//!
//! The daemon never runs the model in-process; it posts gated Somali text to
//! an inference endpoint. The trait keeps the REST layer testable with a
//! canned engine and leaves room for an embedded backend later.

pub mod weights;

use crate::config::ModelConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate Somali `text` to English. Callers gate the language before
    /// calling; the engine itself does no detection.
    async fn translate(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TranslateReply {
    translation: String,
}

/// HTTP client for the model inference endpoint. Posts `{"text": ...}` and
/// expects `{"translation": ...}` back.
pub struct RemoteEngine {
    client: reqwest::Client,
    url: String,
}

impl RemoteEngine {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("failed to build inference client")?;
        Ok(Self {
            client,
            url: cfg.inference_url.clone(),
        })
    }
}

#[async_trait]
impl TranslationEngine for RemoteEngine {
    async fn translate(&self, text: &str) -> Result<String> {
        let reply: TranslateReply = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("inference request failed")?
            .error_for_status()
            .context("inference endpoint returned an error")?
            .json()
            .await
            .context("inference reply was not valid JSON")?;

        if reply.translation.is_empty() {
            return Err(anyhow!("inference endpoint returned an empty translation"));
        }
        Ok(reply.translation)
    }
}
