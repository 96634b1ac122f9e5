//! Scene-by-scene rendering driven by the audio clock.

use crate::assets::resolve::resolve;
use crate::audio::decode::decode_scene_audio;
use crate::foundation::error::{AssetSlot, ReelResult, SceneError};
use crate::scene::model::{AssetRef, Scene};
use crate::session::export::{ExportEvent, ExportSession, SceneReport, SceneStatus};
use crate::visual::{VisualSource, VisualStrategy};

pub(super) struct SequenceRun {
    pub(super) reports: Vec<SceneReport>,
    pub(super) cancelled: bool,
}

struct Rendered {
    start_sample: u64,
    samples: u64,
    frames: u64,
}

impl ExportSession {
    /// Render every scene strictly in input order.
    pub(super) async fn render_scenes(&mut self, scenes: &[Scene]) -> ReelResult<SequenceRun> {
        let mut reports = Vec::with_capacity(scenes.len());
        for (index, scene) in scenes.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(next = index, "cancellation observed at scene boundary");
                return Ok(SequenceRun {
                    reports,
                    cancelled: true,
                });
            }

            self.emit(ExportEvent::SceneStarted {
                index,
                id: scene.id.clone(),
            });
            let status = match self.render_scene(index, scene).await? {
                Ok(r) => {
                    self.rendered += 1;
                    self.emit(ExportEvent::SceneRendered {
                        index,
                        samples: r.samples,
                    });
                    SceneStatus::Rendered {
                        start_sample: r.start_sample,
                        samples: r.samples,
                        frames: r.frames,
                    }
                }
                Err(reason) => {
                    // Missing assets were already reported by the resolver.
                    if !matches!(reason, SceneError::MissingAsset(_)) {
                        tracing::warn!(
                            scene = scene.frame_number,
                            id = %scene.id,
                            "scene skipped: {reason}"
                        );
                    }
                    self.emit(ExportEvent::SceneSkipped {
                        index,
                        reason: reason.clone(),
                    });
                    SceneStatus::Skipped { reason }
                }
            };
            reports.push(SceneReport {
                index,
                id: scene.id.clone(),
                status,
            });
        }

        // The boundary after the last scene counts too: nothing is finalized once cancelled.
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            tracing::info!("cancellation observed after the last scene");
        }
        Ok(SequenceRun { reports, cancelled })
    }

    async fn visual_source(&self, asset: &AssetRef) -> Result<VisualSource, SceneError> {
        if let Some(path) = self.fetcher.local_path(asset) {
            return Ok(VisualSource::Path(path));
        }
        self.fetcher
            .fetch(asset)
            .await
            .map(VisualSource::Bytes)
            .map_err(|e| SceneError::fetch(AssetSlot::Visual, e.to_string()))
    }

    /// Render one scene. The outer error is session-fatal, the inner one skips the scene.
    #[tracing::instrument(skip_all, fields(scene = scene.frame_number, kind = %scene.visual_type))]
    async fn render_scene(
        &mut self,
        index: usize,
        scene: &Scene,
    ) -> ReelResult<Result<Rendered, SceneError>> {
        let resolved = match resolve(index, scene) {
            Ok(r) => r,
            Err(e) => return Ok(Err(e)),
        };

        let audio = match decode_scene_audio(
            self.fetcher.as_ref(),
            self.decoder.as_ref(),
            resolved.audio,
            self.audio_format(),
        )
        .await
        {
            Ok(a) => a,
            Err(e) => return Ok(Err(e)),
        };

        let source = match self.visual_source(resolved.visual).await {
            Ok(s) => s,
            Err(e) => {
                self.surface.clear();
                return Ok(Err(e));
            }
        };
        let mut visual = self
            .visuals
            .create(resolved.kind(), source, self.draw_target());
        if let Err(e) = visual.prepare().await {
            visual.release().await;
            self.surface.clear();
            return Ok(Err(e));
        }

        // Silence between consecutive rendered scenes, holding the previous frame.
        if self.rendered > 0 {
            let gap_end = self.clock.position() + self.config.gap_samples();
            if let Err(e) = self.run_segment(gap_end, None).await {
                visual.release().await;
                return Err(e);
            }
        }

        let start_sample = self.clock.position();
        let samples = audio.frames();
        let source_id = match self.graph.schedule(&audio, start_sample) {
            Ok(id) => id,
            Err(e) => {
                visual.release().await;
                return Err(e);
            }
        };
        drop(audio);

        // Earlier scenes are released, so the graph ends where this narration does.
        let end = self.graph.horizon();
        let played = self.run_segment(end, Some(&mut *visual)).await;
        visual.release().await;
        self.graph.release(source_id);

        let frames = played?;
        tracing::debug!(start_sample, samples, frames, "scene rendered");
        Ok(Ok(Rendered {
            start_sample,
            samples,
            frames,
        }))
    }

    /// Advance the clock to `end`, emitting due frames and the audio in between.
    ///
    /// With no visual the surface is left as is, which holds the last drawn frame.
    async fn run_segment(
        &mut self,
        end: u64,
        mut visual: Option<&mut (dyn VisualStrategy + 'static)>,
    ) -> ReelResult<u64> {
        let mut frames = 0u64;
        while self.clock.position() < end {
            if let Some(idx) = self.clock.due_frame() {
                self.pacer.tick().await;
                if let Some(v) = visual.as_deref_mut() {
                    v.draw_frame(&mut self.surface).await?;
                }
                self.capture.write_video(idx, &self.surface).await?;
                self.clock.advance_frame();
                frames += 1;
            }
            let (from, to) = self.clock.pull_span(end);
            if to > from {
                let samples = self.graph.render(from, to);
                self.capture.write_audio(&samples).await?;
                self.clock.advance_to(to);
            }
        }
        Ok(frames)
    }
}
