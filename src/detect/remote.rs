//! Remote translation-service language check, the last signal in the cascade.
//!
//! The remote call is strictly best-effort: timeouts, transport errors, and
//! malformed replies all collapse to "no signal" so the cascade can fall
//! through to its default verdict. Nothing here may fail the request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Language verdict from a remote detect endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVerdict {
    /// Lowercase ISO 639-1 code reported by the service.
    pub language: String,
    /// Service-reported confidence, expected in [0, 1].
    pub confidence: f64,
}

#[async_trait]
pub trait RemoteLangId: Send + Sync {
    /// Ask the remote service to identify `text`. `None` means no usable
    /// signal, never an error.
    async fn identify(&self, text: &str) -> Option<RemoteVerdict>;
}

#[derive(Debug, Deserialize)]
struct DetectReply {
    language: String,
    confidence: f64,
}

/// HTTP client for a translate-service detect endpoint.
///
/// Posts `{"q": <text>}` and expects `{"language": "..", "confidence": 0.x}`
/// back. The request timeout doubles as the cascade's latency bound for this
/// signal.
pub struct HttpLangId {
    client: reqwest::Client,
    url: String,
}

impl HttpLangId {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build remote language-ID client")?;
        Ok(Self { client, url })
    }

    async fn request(&self, text: &str) -> Result<RemoteVerdict> {
        let reply: DetectReply = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "q": text }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(RemoteVerdict {
            language: reply.language.to_lowercase(),
            confidence: reply.confidence,
        })
    }
}

#[async_trait]
impl RemoteLangId for HttpLangId {
    async fn identify(&self, text: &str) -> Option<RemoteVerdict> {
        match self.request(text).await {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                debug!("remote language check unavailable: {e:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_yields_no_signal() {
        // TEST-NET-1 address, nothing listens there.
        let id = HttpLangId::new(
            "http://192.0.2.1:9/detect".to_string(),
            Duration::from_millis(50),
        )
        .unwrap();
        assert_eq!(id.identify("waxaan tahay").await, None);
    }
}
