//! Writing the finished recording somewhere durable.

pub(crate) mod download;
pub(crate) mod picker;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::encode::recorder::RecordedMedia;
use crate::foundation::error::{ReelError, ReelResult};

/// The final encoded artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputBlob {
    /// Container MIME type.
    pub mime_type: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl OutputBlob {
    /// Concatenate recorded chunks in order.
    pub fn assemble(media: RecordedMedia) -> Self {
        let len = media.chunks.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(len);
        for chunk in media.chunks {
            bytes.extend_from_slice(&chunk);
        }
        Self {
            mime_type: media.mime_type,
            bytes,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of handing a blob to a [`PersistenceBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to this path.
    Saved(PathBuf),
    /// The user declined to pick a destination. Not an error.
    Dismissed,
}

/// Durable storage for the export artifact.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this backend can be used in the current environment.
    fn is_available(&self) -> bool;

    /// Persist `blob`, suggesting `suggested_name` as the file name.
    async fn save(&self, blob: &OutputBlob, suggested_name: &str) -> ReelResult<SaveOutcome>;
}

/// Uses `picker` when it is available and `fallback` otherwise.
pub struct PreferredPersistence<P, F> {
    picker: P,
    fallback: F,
}

impl<P, F> PreferredPersistence<P, F> {
    /// Pair a preferred backend with a fallback.
    pub fn new(picker: P, fallback: F) -> Self {
        Self { picker, fallback }
    }
}

#[async_trait]
impl<P, F> PersistenceBackend for PreferredPersistence<P, F>
where
    P: PersistenceBackend,
    F: PersistenceBackend,
{
    fn name(&self) -> &'static str {
        if self.picker.is_available() {
            self.picker.name()
        } else {
            self.fallback.name()
        }
    }

    fn is_available(&self) -> bool {
        self.picker.is_available() || self.fallback.is_available()
    }

    async fn save(&self, blob: &OutputBlob, suggested_name: &str) -> ReelResult<SaveOutcome> {
        if self.picker.is_available() {
            return self.picker.save(blob, suggested_name).await;
        }
        if !self.fallback.is_available() {
            return Err(ReelError::persist("no persistence backend is available"));
        }
        tracing::debug!(backend = self.fallback.name(), "picker unavailable; using fallback");
        self.fallback.save(blob, suggested_name).await
    }
}

pub(crate) async fn write_blob(path: &std::path::Path, blob: &OutputBlob) -> ReelResult<()> {
    crate::assets::media::ensure_parent_dir(path)?;
    tokio::fs::write(path, &blob.bytes)
        .await
        .map_err(|e| ReelError::persist(format!("write '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), bytes = blob.len(), "video saved");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/persist/mod.rs"]
mod tests;
