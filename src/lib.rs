pub mod auth;
pub mod config;
pub mod detect;
pub mod engine;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use auth::TokenSigner;
use config::ServiceConfig;
use detect::SomaliDetector;
use engine::TranslationEngine;
use storage::media::MediaStore;
use storage::Storage;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServiceConfig>,
    pub storage: Arc<Storage>,
    /// Voice audio blobs on disk, keyed by recording id.
    pub media: Arc<MediaStore>,
    /// The detection cascade; shared and immutable after startup.
    pub detector: Arc<SomaliDetector>,
    /// Inference backend for gated translations.
    pub engine: Arc<dyn TranslationEngine>,
    /// Bearer-token signer/verifier.
    pub tokens: Arc<TokenSigner>,
    pub started_at: std::time::Instant,
}
