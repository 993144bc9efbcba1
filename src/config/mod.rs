use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_INFERENCE_URL: &str = "http://127.0.0.1:8500/translate";
const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 500;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 2;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── DetectorConfig ───────────────────────────────────────────────────────────

/// Language detector tuning (`[detector]` in config.toml).
///
/// The gates and scales control the heuristic cascade; the defaults reproduce
/// the shipped behavior and rarely need changing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum confidence at which a Somali verdict unlocks translation (default: 0.2).
    pub accept_confidence: f64,
    /// Somali-token ratio above which pattern matching fires (default: 0.2).
    pub pattern_gate: f64,
    /// Upper bound on the confidence reported by pattern matching (default: 0.8).
    pub pattern_confidence_cap: f64,
    /// Indicator ratio above which characteristic analysis fires (default: 0.6).
    pub characteristic_gate: f64,
    /// Multiplier applied to the indicator ratio to form its confidence (default: 0.7).
    pub characteristic_scale: f64,
    /// Confidence reported when the statistical backend identifies Somali (default: 0.9).
    pub statistical_confidence: f64,
    /// Confidence attached to the default non-Somali verdict (default: 0.8).
    pub other_confidence: f64,
    /// Run the n-gram statistical backend as the first signal. Default: true.
    /// Disable for fully lexicon-driven (and model-free) detection.
    pub statistical: bool,
    /// Remote translation-service detect endpoint used as the last signal.
    /// None = skip the remote check entirely (default).
    pub remote_url: Option<String>,
    /// Timeout for the remote detect call (milliseconds). Default: 500.
    pub remote_timeout_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            accept_confidence: 0.2,
            pattern_gate: 0.2,
            pattern_confidence_cap: 0.8,
            characteristic_gate: 0.6,
            characteristic_scale: 0.7,
            statistical_confidence: 0.9,
            other_confidence: 0.8,
            statistical: true,
            remote_url: None,
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

// ─── ModelConfig ──────────────────────────────────────────────────────────────

/// Translation model endpoint configuration (`[model]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Inference endpoint the daemon posts Somali text to.
    /// Default: http://127.0.0.1:8500/translate.
    pub inference_url: String,
    /// Request timeout for inference calls (seconds). Default: 30.
    pub request_timeout_secs: u64,
    /// Where `turjubaand fetch-model` downloads the weights archive (.tar.gz).
    /// None = fetch-model requires an explicit --url.
    pub weights_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            request_timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
            weights_url: None,
        }
    }
}

// ─── AuthConfig ───────────────────────────────────────────────────────────────

/// Bearer-token auth configuration (`[auth]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret for bearer tokens. None = generate once and persist
    /// to `{data_dir}/auth_secret` (0600).
    pub secret: Option<String>,
    /// Issued-token lifetime in hours. Default: 2.
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// REST server port (default: 5000).
    port: Option<u16>,
    /// Log level filter string, e.g. "debug", "info,turjubaan=trace" (default: "info").
    log: Option<String>,
    /// Bind address for the REST server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Detector tuning (`[detector]`).
    detector: Option<DetectorConfig>,
    /// Translation model endpoint (`[model]`).
    model: Option<ModelConfig>,
    /// Bearer-token auth (`[auth]`).
    auth: Option<AuthConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── ServiceConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log: String,
    /// Bind address for the REST server (TURJUBAAN_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    /// Detector cascade tuning — gates, scales, backend wiring.
    pub detector: DetectorConfig,
    /// Translation model endpoint and weights source.
    pub model: ModelConfig,
    /// Bearer-token signing secret and lifetime.
    pub auth: AuthConfig,
}

impl ServiceConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("TURJUBAAN_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let detector = toml.detector.unwrap_or_default();

        let mut model = toml.model.unwrap_or_default();
        if let Some(url) = std::env::var("TURJUBAAN_INFERENCE_URL")
            .ok()
            .filter(|s| !s.is_empty())
        {
            model.inference_url = url;
        }

        let mut auth = toml.auth.unwrap_or_default();
        if let Some(secret) = std::env::var("TURJUBAAN_AUTH_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
        {
            auth.secret = Some(secret);
        }

        Self {
            port,
            data_dir,
            log,
            bind_address,
            detector,
            model,
            auth,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/turjubaan
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("turjubaan");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/turjubaan or ~/.local/share/turjubaan
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("turjubaan");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("turjubaan");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\turjubaan
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("turjubaan");
        }
    }
    // Fallback
    PathBuf::from(".turjubaan")
}
