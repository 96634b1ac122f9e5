use std::io::Write as _;
use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};

/// Returns `true` when `ffmpeg` can be spawned from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Returns `true` when the local `ffmpeg` build lists `encoder` in `-encoders`.
pub(crate) async fn encoder_available(encoder: &str) -> bool {
    let Ok(out) = tokio::process::Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .kill_on_drop(true)
        .output()
        .await
    else {
        return false;
    };
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .filter_map(|l| l.split_whitespace().nth(1))
        .any(|name| name == encoder)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::persist(format!(
                "create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// Copy encoded bytes into a named temp file so `ffmpeg` can seek in it.
pub(crate) fn spool_to_temp(bytes: &[u8], suffix: &str) -> ReelResult<tempfile::NamedTempFile> {
    let mut f = tempfile::Builder::new()
        .prefix("storyreel-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| ReelError::session(format!("create temp file: {e}")))?;
    f.write_all(bytes)
        .and_then(|()| f.flush())
        .map_err(|e| ReelError::session(format!("write temp file: {e}")))?;
    Ok(f)
}

/// Interpret little-endian bytes as `f32` samples.
pub(crate) fn f32le_to_samples(bytes: &[u8]) -> ReelResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(feature = "media-ffmpeg")]
/// Decode arbitrary encoded audio to interleaved `f32` PCM at the given format.
pub(crate) async fn decode_audio_f32(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> ReelResult<Vec<f32>> {
    let src = spool_to_temp(bytes, ".audio")?;
    let out = tokio::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(src.path())
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ReelError::validation(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::validation(format!(
            "ffmpeg audio decode failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    f32le_to_samples(&out.stdout)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode arbitrary encoded audio to interleaved `f32` PCM at the given format.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
pub(crate) async fn decode_audio_f32(
    _bytes: &[u8],
    _sample_rate: u32,
    _channels: u16,
) -> ReelResult<Vec<f32>> {
    Err(ReelError::validation(
        "non-WAV audio requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
