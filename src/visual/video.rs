use async_trait::async_trait;

use crate::foundation::error::{ReelResult, SceneError};
use crate::scene::model::VisualKind;
use crate::visual::surface::RenderSurface;
use crate::visual::{DrawTarget, VisualSource, VisualStrategy};

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
struct Playback {
    child: tokio::process::Child,
    stdout: tokio::process::ChildStdout,
    // Keeps a spooled clip alive while ffmpeg reads it.
    _spool: Option<tempfile::NamedTempFile>,
    primed: Option<Vec<u8>>,
    buf: Vec<u8>,
}

enum VideoState {
    Loading(VisualSource),
    Playing(Playback),
    /// Decoding stopped early; the last drawn frame stays on the surface.
    Stalled,
    Stopped,
}

/// Muted clip looped from time zero and sampled once per tick.
///
/// Playback position is independent of the narration; the clip simply loops until the scene's
/// audio ends.
pub struct VideoVisual {
    target: DrawTarget,
    state: VideoState,
}

impl VideoVisual {
    /// Create an unprepared video visual.
    pub fn new(source: VisualSource, target: DrawTarget) -> Self {
        Self {
            target,
            state: VideoState::Loading(source),
        }
    }
}

/// `-vf` chain scaling into the canvas with letterbox bars in the fill colour.
pub(crate) fn letterbox_filter(target: DrawTarget) -> String {
    let (w, h) = (target.canvas.width, target.canvas.height);
    let f = target.fill;
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=0x{:02x}{:02x}{:02x},format=rgba",
        f.r, f.g, f.b
    )
}

#[cfg(feature = "media-ffmpeg")]
async fn start_playback(source: VisualSource, target: DrawTarget) -> Result<Playback, SceneError> {
    use tokio::io::AsyncReadExt as _;

    let (path, spool): (std::path::PathBuf, _) = match source {
        VisualSource::Path(p) => (p, None),
        VisualSource::Bytes(b) => {
            let f = crate::assets::media::spool_to_temp(&b, ".video")
                .map_err(|e| SceneError::visual_load(e.to_string()))?;
            (f.path().to_path_buf(), Some(f))
        }
    };

    let fps = format!("{}/{}", target.fps.num, target.fps.den);
    let mut child = tokio::process::Command::new("ffmpeg")
        .args(["-v", "error", "-stream_loop", "-1", "-i"])
        .arg(&path)
        .args(["-an", "-vf", &letterbox_filter(target), "-r", &fps])
        .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SceneError::visual_load(format!("failed to spawn ffmpeg: {e}")))?;

    let Some(mut stdout) = child.stdout.take() else {
        return Err(SceneError::visual_load("ffmpeg stdout unavailable"));
    };

    // The first frame proves the clip decodes at all.
    let mut first = vec![0u8; target.canvas.rgba_len()];
    if let Err(e) = stdout.read_exact(&mut first).await {
        let _ = child.kill().await;
        return Err(SceneError::visual_load(format!(
            "no decodable video frames in '{}': {e}",
            path.display()
        )));
    }

    Ok(Playback {
        child,
        stdout,
        _spool: spool,
        buf: vec![0u8; first.len()],
        primed: Some(first),
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
async fn start_playback(
    _source: VisualSource,
    _target: DrawTarget,
) -> Result<Playback, SceneError> {
    Err(SceneError::visual_load(
        "video visuals require the 'media-ffmpeg' feature",
    ))
}

#[async_trait]
impl VisualStrategy for VideoVisual {
    fn kind(&self) -> VisualKind {
        VisualKind::Video
    }

    async fn prepare(&mut self) -> Result<(), SceneError> {
        if !matches!(self.state, VideoState::Loading(_)) {
            return Ok(());
        }
        let VideoState::Loading(source) = std::mem::replace(&mut self.state, VideoState::Stopped)
        else {
            return Ok(());
        };
        let playback = start_playback(source, self.target).await?;
        tracing::debug!("video playback started");
        self.state = VideoState::Playing(playback);
        Ok(())
    }

    async fn draw_frame(&mut self, surface: &mut RenderSurface) -> ReelResult<()> {
        use tokio::io::AsyncReadExt as _;

        let VideoState::Playing(p) = &mut self.state else {
            return Ok(());
        };
        if let Some(frame) = p.primed.take() {
            surface.copy_from(&frame)?;
            p.buf = frame;
            return Ok(());
        }
        match p.stdout.read_exact(&mut p.buf).await {
            Ok(_) => surface.copy_from(&p.buf),
            Err(e) => {
                tracing::warn!(error = %e, "video sampling stopped; holding last frame");
                if let VideoState::Playing(mut p) =
                    std::mem::replace(&mut self.state, VideoState::Stalled)
                {
                    let _ = p.child.kill().await;
                }
                Ok(())
            }
        }
    }

    async fn release(&mut self) {
        if let VideoState::Playing(mut p) = std::mem::replace(&mut self.state, VideoState::Stopped)
        {
            let _ = p.child.kill().await;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visual/video.rs"]
mod tests;
