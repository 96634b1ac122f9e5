use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::assets::fetch::{AssetFetcher, LocalFetcher};
use crate::audio::decode::{AudioDecoder, AudioFormat, PcmDecoder};
use crate::audio::graph::AudioGraph;
use crate::capture::CapturePipeline;
use crate::config::ExportConfig;
use crate::encode::ffmpeg::FfmpegRecorder;
use crate::encode::recorder::{Recorder, RecorderConfig};
use crate::foundation::core::{Fps, samples_to_duration};
use crate::foundation::error::{ReelError, ReelResult, SceneError};
use crate::persist::{OutputBlob, PersistenceBackend, SaveOutcome};
use crate::scene::model::Scene;
use crate::session::clock::{MediaClock, Pacer};
use crate::visual::surface::RenderSurface;
use crate::visual::{DefaultVisualLoader, DrawTarget, VisualLoader};

/// Media collaborators used by one export.
pub struct MediaBackend {
    /// Asset bytes.
    pub fetcher: Arc<dyn AssetFetcher>,
    /// Audio decoding.
    pub decoder: Arc<dyn AudioDecoder>,
    /// Visual strategies.
    pub visuals: Arc<dyn VisualLoader>,
    /// Encoder for the session.
    pub recorder: Box<dyn Recorder>,
}

impl MediaBackend {
    /// Local files, WAV/ffmpeg decoding, default visuals and the ffmpeg WebM recorder.
    pub fn ffmpeg(config: &ExportConfig) -> Self {
        Self::with_recorder(config, Box::new(FfmpegRecorder::new()))
    }

    /// Default collaborators with a custom recorder.
    pub fn with_recorder(config: &ExportConfig, recorder: Box<dyn Recorder>) -> Self {
        Self {
            fetcher: Arc::new(LocalFetcher::new(config.assets_root.clone())),
            decoder: Arc::new(PcmDecoder),
            visuals: Arc::new(DefaultVisualLoader),
            recorder,
        }
    }
}

/// Progress notifications emitted while exporting.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportEvent {
    /// Recording started.
    Started {
        /// Scenes in the input list.
        scenes: usize,
    },
    /// A scene is about to be processed.
    SceneStarted {
        /// Position in the input list.
        index: usize,
        /// Scene id.
        id: String,
    },
    /// A scene was rendered into the output.
    SceneRendered {
        /// Position in the input list.
        index: usize,
        /// Audio length in samples.
        samples: u64,
    },
    /// A scene was left out of the output.
    SceneSkipped {
        /// Position in the input list.
        index: usize,
        /// Why.
        reason: SceneError,
    },
    /// The recording was finalized and handed to persistence.
    Finalizing,
}

/// Receives [`ExportEvent`]s.
pub trait ExportObserver: Send + Sync {
    /// Called synchronously from the export task.
    fn on_event(&self, event: &ExportEvent);
}

impl<F> ExportObserver for F
where
    F: Fn(&ExportEvent) + Send + Sync,
{
    fn on_event(&self, event: &ExportEvent) {
        self(event)
    }
}

/// What happened to one scene.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneStatus {
    /// Part of the output.
    Rendered {
        /// Timeline sample where its audio starts.
        start_sample: u64,
        /// Audio length in samples.
        samples: u64,
        /// Video frames emitted while it played.
        frames: u64,
    },
    /// Not part of the output.
    Skipped {
        /// Why.
        reason: SceneError,
    },
}

/// Per-scene line of an [`ExportReport`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneReport {
    /// Position in the input list.
    pub index: usize,
    /// Scene id.
    pub id: String,
    /// Outcome.
    pub status: SceneStatus,
}

/// How an export ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The file was written.
    Saved(PathBuf),
    /// The destination picker was dismissed; nothing was written.
    Dismissed,
    /// Cancelled at a scene boundary; nothing was written.
    Cancelled,
}

/// Summary of one export run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// Scenes in input order. Scenes after a cancellation are absent.
    pub scenes: Vec<SceneReport>,
    /// Audio sample frames written.
    pub audio_samples: u64,
    /// Video frames written.
    pub video_frames: u64,
    /// Audio sample rate.
    pub sample_rate: u32,
    /// Video frame rate.
    pub fps: Fps,
    /// How the run ended.
    pub outcome: ExportOutcome,
}

impl ExportReport {
    /// Length of the audio track.
    pub fn audio_duration(&self) -> Duration {
        samples_to_duration(self.audio_samples, self.sample_rate)
    }

    /// Length of the video track.
    pub fn video_duration(&self) -> Duration {
        if self.fps.num == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(self.video_frames) * u128::from(self.fps.den) * 1_000_000_000
            / u128::from(self.fps.num);
        Duration::from_nanos(nanos as u64)
    }

    /// Number of scenes in the output.
    pub fn rendered_count(&self) -> usize {
        self.scenes
            .iter()
            .filter(|s| matches!(s.status, SceneStatus::Rendered { .. }))
            .count()
    }

    /// Number of scenes left out.
    pub fn skipped_count(&self) -> usize {
        self.scenes
            .iter()
            .filter(|s| matches!(s.status, SceneStatus::Skipped { .. }))
            .count()
    }
}

/// State owned by one export run.
///
/// Everything acquired during the run (scheduled audio, visual decoders, the recorder and its
/// temp files) is released before [`ExportSession::run`] returns, on every path.
pub struct ExportSession {
    pub(super) config: ExportConfig,
    pub(super) fetcher: Arc<dyn AssetFetcher>,
    pub(super) decoder: Arc<dyn AudioDecoder>,
    pub(super) visuals: Arc<dyn VisualLoader>,
    pub(super) capture: CapturePipeline,
    pub(super) graph: AudioGraph,
    pub(super) surface: RenderSurface,
    pub(super) clock: MediaClock,
    pub(super) pacer: Pacer,
    pub(super) cancel: CancellationToken,
    pub(super) observer: Arc<dyn ExportObserver>,
    pub(super) rendered: usize,
}

impl ExportSession {
    /// Validate `config` and set up the audio graph and surface.
    pub fn new(
        config: ExportConfig,
        backend: MediaBackend,
        cancel: CancellationToken,
    ) -> ReelResult<Self> {
        config.validate()?;
        let graph = AudioGraph::new(AudioFormat {
            sample_rate: config.sample_rate,
            channels: config.channels,
        })?;
        Ok(Self {
            surface: RenderSurface::new(config.canvas, config.fill),
            clock: MediaClock::new(config.fps, config.sample_rate),
            pacer: Pacer::new(config.pacing, config.fps),
            capture: CapturePipeline::new(backend.recorder),
            fetcher: backend.fetcher,
            decoder: backend.decoder,
            visuals: backend.visuals,
            graph,
            cancel,
            observer: Arc::new(|_: &ExportEvent| {}),
            rendered: 0,
            config,
        })
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ExportObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub(super) fn audio_format(&self) -> AudioFormat {
        self.graph.format()
    }

    pub(super) fn draw_target(&self) -> DrawTarget {
        DrawTarget {
            canvas: self.config.canvas,
            fill: self.config.fill,
            fps: self.config.fps,
        }
    }

    pub(super) fn emit(&self, event: ExportEvent) {
        self.observer.on_event(&event);
    }

    fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            canvas: self.config.canvas,
            fps: self.config.fps,
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            video_codec: self.config.video_codec.clone(),
            audio_codec: self.config.audio_codec.clone(),
        }
    }

    /// Render `scenes` in order, encode, and hand the result to `persistence`.
    #[tracing::instrument(skip_all, fields(scenes = scenes.len()))]
    pub async fn run(
        mut self,
        scenes: &[Scene],
        persistence: &dyn PersistenceBackend,
    ) -> ReelResult<ExportReport> {
        let result = self.run_inner(scenes, persistence).await;
        self.cleanup();
        if let Err(e) = &result {
            tracing::error!(error = %e, "export failed");
        }
        result
    }

    fn cleanup(&mut self) {
        tracing::debug!(sources = self.graph.live_sources(), "releasing session resources");
        self.graph.release_all();
        self.capture.abort();
    }

    async fn run_inner(
        &mut self,
        scenes: &[Scene],
        persistence: &dyn PersistenceBackend,
    ) -> ReelResult<ExportReport> {
        if scenes.is_empty() {
            return Err(ReelError::session("no scenes to export"));
        }

        self.capture.start(self.recorder_config()).await?;
        self.emit(ExportEvent::Started {
            scenes: scenes.len(),
        });
        tracing::info!(
            width = self.config.canvas.width,
            height = self.config.canvas.height,
            gap_ms = self.config.scene_gap_ms,
            "export started"
        );

        let run = self.render_scenes(scenes).await?;
        let mut report = ExportReport {
            scenes: run.reports,
            audio_samples: self.capture.audio_samples_written(),
            video_frames: self.capture.frames_written(),
            sample_rate: self.config.sample_rate,
            fps: self.config.fps,
            outcome: ExportOutcome::Cancelled,
        };

        if run.cancelled {
            self.capture.abort();
            tracing::info!(rendered = report.rendered_count(), "export cancelled");
            return Ok(report);
        }
        if self.rendered == 0 {
            return Err(ReelError::session(format!(
                "none of the {} scenes could be rendered",
                scenes.len()
            )));
        }

        self.emit(ExportEvent::Finalizing);
        let media = self.capture.finish().await?;
        let blob = OutputBlob::assemble(media);
        tracing::info!(
            bytes = blob.len(),
            backend = persistence.name(),
            audio_ms = report.audio_duration().as_millis() as u64,
            clock_frames = self.clock.frames(),
            "recording finalized"
        );
        report.outcome = match persistence.save(&blob, &self.config.file_name).await? {
            SaveOutcome::Saved(path) => ExportOutcome::Saved(path),
            SaveOutcome::Dismissed => ExportOutcome::Dismissed,
        };
        Ok(report)
    }
}

/// Export `scenes` as one video.
///
/// Resolves once the file was saved, the save was dismissed, or the export was cancelled at a
/// scene boundary. Scene-level failures skip the scene; only session-level failures are errors.
pub async fn export_video(
    scenes: &[Scene],
    config: ExportConfig,
    backend: MediaBackend,
    persistence: &dyn PersistenceBackend,
    cancel: CancellationToken,
    observer: Arc<dyn ExportObserver>,
) -> ReelResult<ExportReport> {
    ExportSession::new(config, backend, cancel)?
        .with_observer(observer)
        .run(scenes, persistence)
        .await
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
