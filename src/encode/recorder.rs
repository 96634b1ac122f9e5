use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::visual::surface::RenderSurface;

/// Configuration handed to a [`Recorder`] when the session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Frame size.
    pub canvas: Canvas,
    /// Frame rate.
    pub fps: Fps,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Audio channel count.
    pub channels: u16,
    /// Preferred video encoder name.
    pub video_codec: String,
    /// Preferred audio encoder name.
    pub audio_codec: String,
}

/// Encoded output of one recording session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordedMedia {
    /// Container MIME type.
    pub mime_type: String,
    /// Encoded data in production order.
    pub chunks: Vec<Vec<u8>>,
}

/// Streaming encoder for one continuous video track and one continuous audio track.
///
/// Ordering contract: `write_video` is called with strictly increasing frame indices, and audio
/// arrives as one contiguous interleaved stream. `abort` stays synchronous so it can run from
/// `Drop`.
#[async_trait]
pub trait Recorder: Send {
    /// Called once before any media is written.
    async fn start(&mut self, cfg: RecorderConfig) -> ReelResult<()>;
    /// Encode the surface as frame `idx`.
    async fn write_video(&mut self, idx: FrameIndex, surface: &RenderSurface) -> ReelResult<()>;
    /// Append interleaved samples to the audio track.
    async fn write_audio(&mut self, samples: &[f32]) -> ReelResult<()>;
    /// Finish encoding and hand back every chunk.
    async fn stop(&mut self) -> ReelResult<RecordedMedia>;
    /// Discard the session. Must be safe to call in any state.
    fn abort(&mut self);
}

/// Lifecycle of a recorder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecorderState {
    /// Not started.
    #[default]
    Idle,
    /// Accepting media.
    Recording,
    /// Stopped normally.
    Stopped,
    /// Aborted.
    Aborted,
}

#[derive(Debug, Default)]
struct MemoryRecording {
    cfg: Option<RecorderConfig>,
    state: RecorderState,
    frames: Vec<(FrameIndex, u64)>,
    audio: Vec<f32>,
    starts: usize,
}

/// Recorder keeping frame fingerprints and raw audio in memory.
///
/// Clones share the same recording so a test can keep a handle after moving one into a session.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecorder {
    inner: Arc<Mutex<MemoryRecording>>,
}

/// MIME type of [`InMemoryRecorder`] output.
pub const MEMORY_MIME: &str = "application/x-storyreel-frames";

impl InMemoryRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryRecording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configuration captured at `start`.
    pub fn config(&self) -> Option<RecorderConfig> {
        self.lock().cfg.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecorderState {
        self.lock().state
    }

    /// Number of `start` calls over the recorder's life.
    pub fn start_count(&self) -> usize {
        self.lock().starts
    }

    /// Frame indices and surface fingerprints in write order.
    pub fn frames(&self) -> Vec<(FrameIndex, u64)> {
        self.lock().frames.clone()
    }

    /// Number of frames written.
    pub fn frame_count(&self) -> u64 {
        self.lock().frames.len() as u64
    }

    /// All audio samples written, interleaved.
    pub fn audio(&self) -> Vec<f32> {
        self.lock().audio.clone()
    }

    /// Audio length in sample frames.
    pub fn audio_frames(&self) -> u64 {
        let g = self.lock();
        let ch = g.cfg.as_ref().map_or(1, |c| usize::from(c.channels.max(1)));
        (g.audio.len() / ch) as u64
    }
}

#[async_trait]
impl Recorder for InMemoryRecorder {
    async fn start(&mut self, cfg: RecorderConfig) -> ReelResult<()> {
        let mut g = self.lock();
        if g.state == RecorderState::Recording {
            return Err(ReelError::encode("recorder already started"));
        }
        g.cfg = Some(cfg);
        g.state = RecorderState::Recording;
        g.frames.clear();
        g.audio.clear();
        g.starts += 1;
        Ok(())
    }

    async fn write_video(&mut self, idx: FrameIndex, surface: &RenderSurface) -> ReelResult<()> {
        let mut g = self.lock();
        if g.state != RecorderState::Recording {
            return Err(ReelError::encode("recorder not started"));
        }
        if let Some(&(last, _)) = g.frames.last()
            && idx <= last
        {
            return Err(ReelError::encode("recorder received out-of-order frame index"));
        }
        g.frames.push((idx, surface.fingerprint()));
        Ok(())
    }

    async fn write_audio(&mut self, samples: &[f32]) -> ReelResult<()> {
        let mut g = self.lock();
        if g.state != RecorderState::Recording {
            return Err(ReelError::encode("recorder not started"));
        }
        g.audio.extend_from_slice(samples);
        Ok(())
    }

    async fn stop(&mut self) -> ReelResult<RecordedMedia> {
        let mut g = self.lock();
        if g.state != RecorderState::Recording {
            return Err(ReelError::encode("recorder not started"));
        }
        g.state = RecorderState::Stopped;
        let mut chunks = Vec::with_capacity(g.frames.len() + 1);
        for (idx, fp) in &g.frames {
            let mut c = idx.0.to_le_bytes().to_vec();
            c.extend_from_slice(&fp.to_le_bytes());
            chunks.push(c);
        }
        chunks.push((g.audio.len() as u64).to_le_bytes().to_vec());
        Ok(RecordedMedia {
            mime_type: MEMORY_MIME.to_string(),
            chunks,
        })
    }

    fn abort(&mut self) {
        let mut g = self.lock();
        if g.state == RecorderState::Recording {
            g.state = RecorderState::Aborted;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;
