use super::*;
use crate::foundation::error::ReelError;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct Fake {
    calls: AtomicUsize,
    fail_on: Option<&'static str>,
}

impl Fake {
    fn check(&self, input: &str, out: String) -> ReelResult<AssetRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(input) {
            return Err(ReelError::validation("no payload returned"));
        }
        Ok(AssetRef::new(out))
    }
}

#[async_trait]
impl ImageGenerator for Fake {
    async fn generate_image(&self, prompt: &str) -> ReelResult<AssetRef> {
        self.check(prompt, format!("{prompt}.png"))
    }
}

#[async_trait]
impl VideoGenerator for Fake {
    async fn generate_video(&self, prompt: &str) -> ReelResult<AssetRef> {
        self.check(prompt, format!("{prompt}.mp4"))
    }
}

#[async_trait]
impl SpeechSynthesizer for Fake {
    async fn synthesize(&self, text: &str) -> ReelResult<AssetRef> {
        self.check(text, format!("{text}.wav"))
    }
}

fn gens(images: Arc<Fake>, videos: Arc<Fake>, speech: Arc<Fake>) -> MediaGenerators {
    MediaGenerators {
        images,
        videos,
        speech,
    }
}

#[tokio::test]
async fn fills_missing_assets_by_kind() {
    let mut board = Storyboard::new(vec![
        Scene::new(1, "one", "still", VisualKind::Image),
        Scene::new(2, "two", "clip", VisualKind::Video),
    ]);
    let images = Arc::new(Fake::default());
    let videos = Arc::new(Fake::default());
    let speech = Arc::new(Fake::default());
    let summary = generate_media(
        &mut board,
        &gens(images.clone(), videos.clone(), speech.clone()),
    )
    .await;

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(board.scenes[0].visual().unwrap().as_str(), "still.png");
    assert_eq!(board.scenes[1].visual().unwrap().as_str(), "clip.mp4");
    assert_eq!(board.scenes[1].audio().unwrap().as_str(), "two.wav");
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    assert_eq!(videos.calls.load(Ordering::SeqCst), 1);
    assert_eq!(speech.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failure_is_recorded_per_scene_and_partial_results_kept() {
    let mut board = Storyboard::new(vec![
        Scene::new(1, "one", "bad", VisualKind::Image),
        Scene::new(2, "two", "good", VisualKind::Image),
    ]);
    let images = Arc::new(Fake {
        fail_on: Some("bad"),
        ..Fake::default()
    });
    let summary = generate_media(
        &mut board,
        &gens(images, Arc::new(Fake::default()), Arc::new(Fake::default())),
    )
    .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.completed, 1);
    let bad = &board.scenes[0];
    assert!(bad.error.as_deref().unwrap().contains("visual"));
    assert_eq!(bad.audio().unwrap().as_str(), "one.wav");
    assert!(bad.visual().is_none());
    assert!(board.scenes[1].error.is_none());
}

#[tokio::test]
async fn complete_scenes_are_not_regenerated() {
    let mut board = Storyboard::new(vec![
        Scene::new(1, "one", "p", VisualKind::Image).with_assets("x.wav", "x.png"),
        Scene::new(2, "two", "q", VisualKind::Image).with_assets("y.wav", ""),
    ]);
    let speech = Arc::new(Fake::default());
    let images = Arc::new(Fake::default());
    let summary = generate_media(
        &mut board,
        &gens(images.clone(), Arc::new(Fake::default()), speech.clone()),
    )
    .await;
    assert_eq!(summary.already_complete, 1);
    assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    assert_eq!(board.scenes[1].visual().unwrap().as_str(), "q.png");
}
