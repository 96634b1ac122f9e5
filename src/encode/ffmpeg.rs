use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _, BufWriter};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;

use crate::assets::media::encoder_available;
use crate::audio::mix::write_f32le;
use crate::encode::recorder::{RecordedMedia, Recorder, RecorderConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::visual::surface::RenderSurface;

/// MIME type of [`FfmpegRecorder`] output.
pub const WEBM_MIME: &str = "video/webm";

const CHUNK_SIZE: usize = 64 * 1024;

type StderrDrain = JoinHandle<std::io::Result<Vec<u8>>>;

struct Running {
    cfg: RecorderConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<StderrDrain>,
    audio: BufWriter<tokio::fs::File>,
    audio_scratch: Vec<u8>,
    audio_codec: Vec<String>,
    // Holds the intermediate video and the spooled audio; removed on drop.
    workdir: tempfile::TempDir,
    last_idx: Option<FrameIndex>,
    frame_len: usize,
}

impl Running {
    fn video_path(&self) -> PathBuf {
        self.workdir.path().join("video.webm")
    }

    fn audio_path(&self) -> PathBuf {
        self.workdir.path().join("audio.f32le")
    }
}

/// Recorder that drives the system `ffmpeg` and produces WebM.
///
/// Frames stream into an encoder child as raw RGBA; audio is spooled to a temp file. `stop`
/// finishes the video pass, then muxes video and audio into WebM on stdout, collected as chunks.
/// All child I/O goes through `tokio::process`, so encoding never blocks the runtime.
#[derive(Default)]
pub struct FfmpegRecorder {
    running: Option<Running>,
}

impl FfmpegRecorder {
    /// Create an idle recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

fn spawn_drain(child: &mut Child) -> ReelResult<StderrDrain> {
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
    Ok(tokio::spawn(async move {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }))
}

async fn join_drain(drain: Option<StderrDrain>) -> ReelResult<String> {
    let bytes = match drain {
        Some(handle) => handle
            .await
            .map_err(|e| ReelError::encode(format!("ffmpeg stderr drain task failed: {e}")))?
            .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
        None => Vec::new(),
    };
    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

fn spawn_error(what: &str, e: std::io::Error) -> ReelError {
    if e.kind() == ErrorKind::NotFound {
        ReelError::encode("ffmpeg is required for WebM encoding, but was not found on PATH")
    } else {
        ReelError::encode(format!("failed to spawn ffmpeg {what}: {e}"))
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // rawvideo input needs its rate before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Encoder arguments, or none when the preferred encoder is unavailable.
async fn codec_args(flag: &str, preferred: &str) -> Vec<String> {
    if encoder_available(preferred).await {
        vec![flag.to_string(), preferred.to_string()]
    } else {
        tracing::debug!(encoder = preferred, "encoder unavailable; using container default");
        Vec::new()
    }
}

fn video_pass(cfg: &RecorderConfig, codec: &[String], out: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd.args([
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
    ]);
    push_input_fps(&mut cmd, cfg.fps);
    cmd.args(["-i", "pipe:0", "-an"]);
    cmd.args(codec);
    cmd.args(["-pix_fmt", "yuv420p", "-f", "webm"]).arg(out);
    cmd
}

fn mux_pass(cfg: &RecorderConfig, codec: &[String], video: &Path, audio: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd.args(["-loglevel", "error", "-i"])
        .arg(video)
        .args([
            "-f",
            "f32le",
            "-ar",
            &cfg.sample_rate.to_string(),
            "-ac",
            &cfg.channels.to_string(),
            "-i",
        ])
        .arg(audio)
        .args(["-map", "0:v", "-map", "1:a", "-c:v", "copy"]);
    cmd.args(codec);
    cmd.args(["-f", "webm", "pipe:1"]);
    cmd
}

fn validate(cfg: &RecorderConfig) -> ReelResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(ReelError::validation("fps must be non-zero"));
    }
    if cfg.canvas.width == 0 || cfg.canvas.height == 0 {
        return Err(ReelError::validation(
            "recorder width/height must be non-zero",
        ));
    }
    if !cfg.canvas.width.is_multiple_of(2) || !cfg.canvas.height.is_multiple_of(2) {
        return Err(ReelError::validation(
            "recorder width/height must be even (required for yuv420p output)",
        ));
    }
    if cfg.sample_rate == 0 || cfg.channels == 0 {
        return Err(ReelError::validation(
            "audio sample_rate and channels must be non-zero",
        ));
    }
    Ok(())
}

#[async_trait]
impl Recorder for FfmpegRecorder {
    async fn start(&mut self, cfg: RecorderConfig) -> ReelResult<()> {
        if self.running.is_some() {
            return Err(ReelError::encode("recorder already started"));
        }
        validate(&cfg)?;

        let workdir = tempfile::Builder::new()
            .prefix("storyreel-rec-")
            .tempdir()
            .map_err(|e| ReelError::encode(format!("create recorder temp dir: {e}")))?;
        let audio_path = workdir.path().join("audio.f32le");
        let audio = tokio::fs::File::create(&audio_path)
            .await
            .map(BufWriter::new)
            .map_err(|e| {
                ReelError::encode(format!(
                    "create audio spool '{}': {e}",
                    audio_path.display()
                ))
            })?;

        let video_codec = codec_args("-c:v", &cfg.video_codec).await;
        let audio_codec = codec_args("-c:a", &cfg.audio_codec).await;
        let mut child = video_pass(&cfg, &video_codec, &workdir.path().join("video.webm"))
            .spawn()
            .map_err(|e| spawn_error("encoder", e))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr_drain = spawn_drain(&mut child)?;

        tracing::debug!(
            width = cfg.canvas.width,
            height = cfg.canvas.height,
            codec = %cfg.video_codec,
            "ffmpeg recorder started"
        );
        self.running = Some(Running {
            frame_len: cfg.canvas.rgba_len(),
            cfg,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            audio,
            audio_scratch: Vec::new(),
            audio_codec,
            workdir,
            last_idx: None,
        });
        Ok(())
    }

    async fn write_video(&mut self, idx: FrameIndex, surface: &RenderSurface) -> ReelResult<()> {
        let run = self
            .running
            .as_mut()
            .ok_or_else(|| ReelError::encode("recorder not started"))?;
        if let Some(last) = run.last_idx
            && idx <= last
        {
            return Err(ReelError::encode(
                "recorder received out-of-order frame index",
            ));
        }
        run.last_idx = Some(idx);

        if surface.data().len() != run.frame_len {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {} bytes, expected {}",
                surface.data().len(),
                run.frame_len
            )));
        }
        let Some(stdin) = run.stdin.as_mut() else {
            return Err(ReelError::encode("recorder is already finalized"));
        };
        stdin.write_all(surface.data()).await.map_err(|e| {
            ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    async fn write_audio(&mut self, samples: &[f32]) -> ReelResult<()> {
        let run = self
            .running
            .as_mut()
            .ok_or_else(|| ReelError::encode("recorder not started"))?;
        run.audio_scratch.clear();
        write_f32le(&mut run.audio_scratch, samples)?;
        run.audio
            .write_all(&run.audio_scratch)
            .await
            .map_err(|e| ReelError::encode(format!("failed to spool audio samples: {e}")))
    }

    async fn stop(&mut self) -> ReelResult<RecordedMedia> {
        let mut run = self
            .running
            .take()
            .ok_or_else(|| ReelError::encode("recorder not started"))?;

        drop(run.stdin.take());
        let status = run.child.wait().await.map_err(|e| {
            ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr = join_drain(run.stderr_drain.take()).await?;
        if !status.success() {
            return Err(ReelError::encode(format!(
                "ffmpeg video pass exited with status {status}: {stderr}"
            )));
        }
        run.audio
            .flush()
            .await
            .map_err(|e| ReelError::encode(format!("flush audio spool: {e}")))?;

        let mut mux = mux_pass(&run.cfg, &run.audio_codec, &run.video_path(), &run.audio_path())
            .spawn()
            .map_err(|e| spawn_error("mux", e))?;
        let drain = spawn_drain(&mut mux)?;
        let mut stdout = mux
            .stdout
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdout (unexpected)"))?;

        let mut chunks = Vec::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => chunks.push(buf[..n].to_vec()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = mux.kill().await;
                    drain.abort();
                    return Err(ReelError::encode(format!("read muxed output: {e}")));
                }
            }
        }
        let status = mux
            .wait()
            .await
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg mux: {e}")))?;
        let stderr = join_drain(Some(drain)).await?;
        if !status.success() {
            return Err(ReelError::encode(format!(
                "ffmpeg mux exited with status {status}: {stderr}"
            )));
        }

        tracing::debug!(chunks = chunks.len(), "ffmpeg recorder stopped");
        Ok(RecordedMedia {
            mime_type: WEBM_MIME.to_string(),
            chunks,
        })
    }

    fn abort(&mut self) {
        if let Some(mut run) = self.running.take() {
            drop(run.stdin.take());
            // The runtime reaps the child once it exits; `kill_on_drop` covers a failed signal.
            let _ = run.child.start_kill();
            if let Some(drain) = run.stderr_drain.take() {
                drain.abort();
            }
            tracing::debug!("ffmpeg recorder aborted");
        }
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
