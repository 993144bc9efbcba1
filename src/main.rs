use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use turjubaan::auth::{get_or_create_secret, TokenSigner};
use turjubaan::config::ServiceConfig;
use turjubaan::detect::SomaliDetector;
use turjubaan::engine::{weights, RemoteEngine};
use turjubaan::rest;
use turjubaan::storage::{media::MediaStore, Storage};
use turjubaan::AppContext;

#[derive(Parser)]
#[command(
    name = "turjubaand",
    about = "Somali-English translation service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port
    #[arg(long, env = "TURJUBAAN_PORT")]
    port: Option<u16>,

    /// Data directory for the database, auth secret, and voice blobs
    #[arg(long, env = "TURJUBAAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TURJUBAAN_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TURJUBAAN_BIND")]
    bind_address: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default when no subcommand given).
    Serve,
    /// Run the language detector once and print the verdict as JSON.
    ///
    /// Examples:
    ///   turjubaand detect "Salaan, sidee tahay?"
    Detect {
        /// Text to classify
        text: String,
    },
    /// Download and unpack the translation model weights into the data dir.
    ///
    /// Skips the download when the model directory already exists.
    FetchModel {
        /// Archive URL (.tar.gz); defaults to the configured model.weights_url
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init once, before any tracing calls. The detect subcommand prints JSON
    // on stdout, so it stays quiet unless a level was asked for.
    let default_level = match &args.command {
        Some(Command::Detect { .. }) => "warn",
        _ => "info",
    };
    let log_level = args
        .log
        .clone()
        .unwrap_or_else(|| default_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .compact()
        .init();

    let Args {
        command,
        port,
        data_dir,
        log,
        bind_address,
    } = args;
    let config = ServiceConfig::new(port, data_dir, log, bind_address);

    match command {
        Some(Command::Detect { text }) => run_detect(&config, &text).await,
        Some(Command::FetchModel { url }) => run_fetch_model(&config, url).await,
        None | Some(Command::Serve) => run_server(config).await,
    }
}

async fn run_detect(config: &ServiceConfig, text: &str) -> Result<()> {
    let detector = SomaliDetector::from_config(&config.detector)?;
    let detection = detector.detect(text).await;
    let report = json!({
        "text": text,
        "language": detection.language.code(),
        "confidence": detection.confidence,
        "method": detection.method.as_str(),
        "is_somali": detection.is_somali(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_fetch_model(config: &ServiceConfig, url: Option<String>) -> Result<()> {
    let url = url
        .or_else(|| config.model.weights_url.clone())
        .context("no weights URL configured; pass --url or set model.weights_url")?;
    let dir = weights::fetch(&url, &config.data_dir).await?;
    println!("model ready at {}", dir.display());
    Ok(())
}

async fn run_server(config: ServiceConfig) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "turjubaand starting");

    let config = Arc::new(config);
    info!(
        data_dir = %config.data_dir.display(),
        port = config.port,
        inference_url = %config.model.inference_url,
        "config loaded"
    );

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

    let storage = Arc::new(Storage::new(&config.data_dir).await?);
    let media = Arc::new(MediaStore::new(&config.data_dir));
    let detector = Arc::new(SomaliDetector::from_config(&config.detector)?);
    let engine = Arc::new(RemoteEngine::from_config(&config.model)?);

    let secret = match &config.auth.secret {
        Some(s) => s.clone(),
        None => get_or_create_secret(&config.data_dir)?,
    };
    let tokens = Arc::new(TokenSigner::new(secret, config.auth.token_ttl_hours));

    let ctx = Arc::new(AppContext {
        config: config.clone(),
        storage,
        media,
        detector,
        engine,
        tokens,
        started_at: std::time::Instant::now(),
    });

    rest::start_rest_server(ctx).await
}
