//! Voice blob store: decoded audio lives on disk under `{data_dir}/voice`,
//! one WAV file per recording id, while the row metadata stays in SQLite.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("voice"),
        }
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.wav"))
    }

    pub async fn save(&self, id: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let path = self.blob_path(id);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub async fn read(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(id);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }

    /// Remove a blob; a missing file is not an error (the row may have been
    /// created before its audio was written, or cleaned up out of band).
    pub async fn remove(&self, id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.blob_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove voice blob"),
        }
    }
}
