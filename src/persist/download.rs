use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::foundation::error::{ReelError, ReelResult};
use crate::persist::{OutputBlob, PersistenceBackend, SaveOutcome, write_blob};

/// Saves straight into a directory without asking, never overwriting.
#[derive(Clone, Debug)]
pub struct AutoDownload {
    dir: PathBuf,
}

impl AutoDownload {
    /// Save into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save into the user's download directory, or the working directory when there is none.
    pub fn to_downloads() -> Self {
        let dir = dirs::download_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// First free path for `name` in `dir`: `name`, then `stem (1).ext`, `stem (2).ext`, ...
pub(crate) fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let p = Path::new(name);
    let stem = p
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = p.extension().map(|e| e.to_string_lossy().into_owned());
    (1u32..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|c| !c.exists())
        .unwrap_or(first)
}

#[async_trait]
impl PersistenceBackend for AutoDownload {
    fn name(&self) -> &'static str {
        "auto-download"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn save(&self, blob: &OutputBlob, suggested_name: &str) -> ReelResult<SaveOutcome> {
        if suggested_name.trim().is_empty() {
            return Err(ReelError::persist("suggested file name is empty"));
        }
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ReelError::persist(format!("create '{}': {e}", self.dir.display()))
        })?;
        let path = unique_path(&self.dir, suggested_name);
        write_blob(&path, blob).await?;
        Ok(SaveOutcome::Saved(path))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/download.rs"]
mod tests;
