//! Binds the render surface and audio-graph output into one recording.

use crate::encode::recorder::{RecordedMedia, Recorder, RecorderConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::visual::surface::RenderSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CaptureState {
    Idle,
    Capturing,
    Finished,
    Aborted,
}

/// Owns the session recorder from before the first scene until after the last one.
///
/// Dropping a pipeline that is still capturing aborts the recorder.
pub struct CapturePipeline {
    recorder: Box<dyn Recorder>,
    state: CaptureState,
    channels: u16,
    frames: u64,
    audio_samples: u64,
}

impl CapturePipeline {
    /// Wrap a recorder.
    pub fn new(recorder: Box<dyn Recorder>) -> Self {
        Self {
            recorder,
            state: CaptureState::Idle,
            channels: 1,
            frames: 0,
            audio_samples: 0,
        }
    }

    /// Start the recorder. Fails if already started.
    pub async fn start(&mut self, cfg: RecorderConfig) -> ReelResult<()> {
        if self.state != CaptureState::Idle {
            return Err(ReelError::session("capture already started"));
        }
        self.channels = cfg.channels.max(1);
        self.recorder.start(cfg).await?;
        self.state = CaptureState::Capturing;
        Ok(())
    }

    fn ensure_capturing(&self) -> ReelResult<()> {
        if self.state == CaptureState::Capturing {
            Ok(())
        } else {
            Err(ReelError::session("capture is not running"))
        }
    }

    /// Capture the surface as frame `idx`.
    pub async fn write_video(
        &mut self,
        idx: FrameIndex,
        surface: &RenderSurface,
    ) -> ReelResult<()> {
        self.ensure_capturing()?;
        self.recorder.write_video(idx, surface).await?;
        self.frames += 1;
        Ok(())
    }

    /// Capture interleaved audio.
    pub async fn write_audio(&mut self, samples: &[f32]) -> ReelResult<()> {
        self.ensure_capturing()?;
        if samples.is_empty() {
            return Ok(());
        }
        self.recorder.write_audio(samples).await?;
        self.audio_samples += (samples.len() / usize::from(self.channels)) as u64;
        Ok(())
    }

    /// Stop the recorder and return its chunks.
    pub async fn finish(&mut self) -> ReelResult<RecordedMedia> {
        self.ensure_capturing()?;
        match self.recorder.stop().await {
            Ok(media) => {
                self.state = CaptureState::Finished;
                tracing::info!(
                    frames = self.frames,
                    audio_samples = self.audio_samples,
                    chunks = media.chunks.len(),
                    "capture finished"
                );
                Ok(media)
            }
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }

    /// Abort the recorder if it is running.
    pub fn abort(&mut self) {
        if self.state == CaptureState::Capturing {
            self.recorder.abort();
            self.state = CaptureState::Aborted;
            tracing::debug!("capture aborted");
        }
    }

    /// Frames captured so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Audio sample frames captured so far.
    pub fn audio_samples_written(&self) -> u64 {
        self.audio_samples
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
#[path = "../tests/unit/capture.rs"]
mod tests;
