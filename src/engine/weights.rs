//! Model weight download: fetch a .tar.gz archive and unpack it under
//! `{data_dir}/model` for the inference server to load.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Download and unpack the weights archive. A populated model directory is
/// left alone, so rerunning the command is cheap and offline-safe.
pub async fn fetch(url: &str, data_dir: &Path) -> Result<PathBuf> {
    let model_dir = data_dir.join("model");
    if model_dir.exists() {
        info!(path = %model_dir.display(), "model weights already present — skipping download");
        return Ok(model_dir);
    }

    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    info!(url, "downloading model weights");
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(600))
        .build()
        .context("failed to build download client")?;

    let bytes = client
        .get(url)
        .send()
        .await
        .context("weights download failed")?
        .error_for_status()
        .context("weights server returned an error")?
        .bytes()
        .await
        .context("failed to read weights archive body")?;

    let archive_path = data_dir.join("model.tar.gz");
    tokio::fs::write(&archive_path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", archive_path.display()))?;

    // Extraction is synchronous (flate2 + tar); keep it off the runtime.
    let archive = archive_path.clone();
    let dest = model_dir.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::open(&archive)
            .with_context(|| format!("failed to open {}", archive.display()))?;
        let tar = GzDecoder::new(file);
        let mut ar = tar::Archive::new(tar);
        ar.unpack(&dest)
            .with_context(|| format!("failed to unpack archive into {}", dest.display()))?;
        Ok(())
    })
    .await
    .context("archive extraction task panicked")??;

    tokio::fs::remove_file(&archive_path).await.ok();

    info!(path = %model_dir.display(), "model weights ready");
    Ok(model_dir)
}
