use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use std::path::{Path, PathBuf};

/// Upper bound for the inter-scene gap.
pub const MAX_SCENE_GAP_MS: u64 = 1_000;

/// How media-clock ticks are spaced in wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// One tick per frame period of wall-clock time.
    Realtime,
    /// Ticks run as fast as the recorder accepts them.
    #[default]
    Offline,
}

/// Settings for one export run.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// scene_gap_ms = 120
/// file_name = "incident-report.webm"
///
/// [canvas]
/// width = 1920
/// height = 1080
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Render surface size.
    pub canvas: Canvas,
    /// Output frame rate; also the video sampling cadence.
    pub fps: Fps,
    /// Audio graph sample rate in Hz.
    pub sample_rate: u32,
    /// Audio graph channel count (1 or 2).
    pub channels: u16,
    /// Silence inserted between consecutive scenes.
    pub scene_gap_ms: u64,
    /// Neutral fill used for letterbox bars and cleared surfaces.
    pub fill: Rgba8,
    /// Suggested output file name.
    pub file_name: String,
    /// Tick pacing.
    pub pacing: Pacing,
    /// Preferred ffmpeg video encoder.
    pub video_codec: String,
    /// ffmpeg audio encoder.
    pub audio_codec: String,
    /// Base directory for relative asset paths.
    pub assets_root: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            sample_rate: 48_000,
            channels: 2,
            scene_gap_ms: 100,
            fill: Rgba8::BLACK,
            file_name: "VideoReport.webm".to_string(),
            pacing: Pacing::Offline,
            video_codec: "libvpx-vp9".to_string(),
            audio_codec: "libopus".to_string(),
            assets_root: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> ReelResult<Self> {
        let cfg: Self =
            toml::from_str(s).map_err(|e| ReelError::config(format!("parse export TOML: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a TOML file.
    ///
    /// Relative `assets_root` values are resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReelError::config(format!("read export config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&text)?;
        if cfg.assets_root.is_relative()
            && let Some(parent) = path.parent()
        {
            cfg.assets_root = parent.join(&cfg.assets_root);
        }
        Ok(cfg)
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::config("canvas width/height must be non-zero"));
        }
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(ReelError::config(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ReelError::config("fps must be non-zero"));
        }
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(ReelError::config(format!(
                "sample_rate {} is outside 8000..=192000",
                self.sample_rate
            )));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(ReelError::config("channels must be 1 or 2"));
        }
        if self.scene_gap_ms > MAX_SCENE_GAP_MS {
            return Err(ReelError::config(format!(
                "scene_gap_ms must be <= {MAX_SCENE_GAP_MS}"
            )));
        }
        if self.file_name.trim().is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(ReelError::config(
                "file_name must be a bare, non-empty file name",
            ));
        }
        if self.video_codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(ReelError::config("codec names must be non-empty"));
        }
        Ok(())
    }

    /// Inter-scene gap in graph samples.
    pub fn gap_samples(&self) -> u64 {
        crate::foundation::core::ms_to_samples(self.scene_gap_ms, self.sample_rate)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
