use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::foundation::error::ReelResult;
use crate::scene::model::{AssetRef, Scene, Storyboard, VisualKind};

/// Image synthesis collaborator.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate a 16:9 still for `prompt`.
    async fn generate_image(&self, prompt: &str) -> ReelResult<AssetRef>;
}

/// Video synthesis collaborator. Polling a long-running job is the implementor's business.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generate a short 16:9 clip for `prompt`.
    async fn generate_video(&self, prompt: &str) -> ReelResult<AssetRef>;
}

/// Text-to-speech collaborator.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize narration for `text`.
    async fn synthesize(&self, text: &str) -> ReelResult<AssetRef>;
}

/// The three asset generators used to fill in a storyboard.
#[derive(Clone)]
pub struct MediaGenerators {
    /// Still images.
    pub images: Arc<dyn ImageGenerator>,
    /// Video clips.
    pub videos: Arc<dyn VideoGenerator>,
    /// Narration.
    pub speech: Arc<dyn SpeechSynthesizer>,
}

/// Counts from one [`generate_media`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Scenes that already had both assets.
    pub already_complete: usize,
    /// Scenes that ended the pass with both assets.
    pub completed: usize,
    /// Scenes that recorded an error.
    pub failed: usize,
}

struct SceneOutcome {
    audio: Option<ReelResult<AssetRef>>,
    visual: Option<ReelResult<AssetRef>>,
}

async fn generate_scene(scene: &Scene, gens: &MediaGenerators) -> SceneOutcome {
    let audio = async {
        if scene.audio().is_some() {
            return None;
        }
        Some(gens.speech.synthesize(&scene.script).await)
    };
    let visual = async {
        if scene.visual().is_some() {
            return None;
        }
        Some(match scene.visual_type {
            VisualKind::Image => gens.images.generate_image(&scene.visual_prompt).await,
            VisualKind::Video => gens.videos.generate_video(&scene.visual_prompt).await,
        })
    };
    let (audio, visual) = tokio::join!(audio, visual);
    SceneOutcome { audio, visual }
}

/// Fill in missing narration and visuals for every scene.
///
/// All scenes are generated concurrently, and within a scene the narration and the visual are
/// generated concurrently. A failure is recorded on the scene's `error` field and never affects
/// other scenes; whatever did succeed for that scene is kept.
#[tracing::instrument(skip_all, fields(scenes = board.len()))]
pub async fn generate_media(board: &mut Storyboard, gens: &MediaGenerators) -> GenerationSummary {
    let mut summary = GenerationSummary::default();

    let pending: Vec<usize> = board
        .scenes
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_renderable())
        .map(|(i, _)| i)
        .collect();
    summary.already_complete = board.len() - pending.len();

    for &i in &pending {
        board.scenes[i].error = None;
    }

    let outcomes = {
        let board_ref = &*board;
        join_all(
            pending
                .iter()
                .map(|&i| generate_scene(&board_ref.scenes[i], gens)),
        )
        .await
    };

    for (&i, outcome) in pending.iter().zip(outcomes) {
        let scene = &mut board.scenes[i];
        let mut errors = Vec::new();
        match outcome.audio {
            Some(Ok(r)) => scene.audio_url = Some(r),
            Some(Err(e)) => errors.push(format!("audio: {e}")),
            None => {}
        }
        match outcome.visual {
            Some(Ok(r)) => scene.visual_url = Some(r),
            Some(Err(e)) => errors.push(format!("visual: {e}")),
            None => {}
        }
        if errors.is_empty() {
            summary.completed += 1;
        } else {
            let msg = errors.join("; ");
            tracing::warn!(scene = scene.frame_number, error = %msg, "scene generation failed");
            scene.error = Some(msg);
            summary.failed += 1;
        }
    }

    tracing::info!(
        completed = summary.completed,
        failed = summary.failed,
        skipped = summary.already_complete,
        "media generation finished"
    );
    summary
}

#[cfg(test)]
#[path = "../../tests/unit/scene/generate.rs"]
mod tests;
