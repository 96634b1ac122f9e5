use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::model::AssetRef;

/// Turns an [`AssetRef`] into bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the full encoded asset.
    async fn fetch(&self, asset: &AssetRef) -> ReelResult<Vec<u8>>;

    /// Filesystem path backing `asset`, when there is one.
    ///
    /// Decoders that need a seekable file (looping video) use this to avoid a temp copy.
    fn local_path(&self, _asset: &AssetRef) -> Option<PathBuf> {
        None
    }
}

/// Fetcher for paths, `file://` URLs and `data:` URIs.
///
/// Relative paths are resolved against `root`.
#[derive(Clone, Debug)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    /// Create a fetcher resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, raw: &str) -> ReelResult<PathBuf> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("blob:") {
            return Err(ReelError::validation(format!(
                "remote asset reference '{raw}' is not supported by the local fetcher"
            )));
        }
        let p = Path::new(raw.strip_prefix("file://").unwrap_or(raw));
        if p.is_absolute() {
            Ok(p.to_path_buf())
        } else {
            Ok(self.root.join(p))
        }
    }
}

#[async_trait]
impl AssetFetcher for LocalFetcher {
    async fn fetch(&self, asset: &AssetRef) -> ReelResult<Vec<u8>> {
        if let Some(rest) = asset.as_str().trim().strip_prefix("data:") {
            return decode_data_uri(rest);
        }
        let path = self.path_for(asset.as_str())?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            ReelError::validation(format!("read asset '{}': {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "asset fetched");
        Ok(bytes)
    }

    fn local_path(&self, asset: &AssetRef) -> Option<PathBuf> {
        if asset.as_str().trim().starts_with("data:") {
            return None;
        }
        self.path_for(asset.as_str()).ok().filter(|p| p.is_file())
    }
}

/// Decode the part of a `data:` URI after the scheme.
pub(crate) fn decode_data_uri(rest: &str) -> ReelResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReelError::validation("data URI is missing ','"))?;
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ReelError::validation(format!("data URI base64 payload: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
