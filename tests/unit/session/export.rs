use super::*;
use crate::encode::recorder::{InMemoryRecorder, RecorderState};

fn report(audio_samples: u64, video_frames: u64) -> ExportReport {
    ExportReport {
        scenes: vec![
            SceneReport {
                index: 0,
                id: "scene-001".to_string(),
                status: SceneStatus::Rendered {
                    start_sample: 0,
                    samples: audio_samples,
                    frames: video_frames,
                },
            },
            SceneReport {
                index: 1,
                id: "scene-002".to_string(),
                status: SceneStatus::Skipped {
                    reason: SceneError::decode("bad"),
                },
            },
        ],
        audio_samples,
        video_frames,
        sample_rate: 48_000,
        fps: Fps::default(),
        outcome: ExportOutcome::Dismissed,
    }
}

#[test]
fn report_durations_and_counts() {
    let r = report(96_000, 60);
    assert_eq!(r.audio_duration(), Duration::from_secs(2));
    assert_eq!(r.video_duration(), Duration::from_secs(2));
    assert_eq!(r.rendered_count(), 1);
    assert_eq!(r.skipped_count(), 1);
}

#[test]
fn invalid_config_is_rejected_before_recording() {
    let rec = InMemoryRecorder::new();
    let cfg = ExportConfig {
        channels: 0,
        ..ExportConfig::default()
    };
    let backend = MediaBackend::with_recorder(&cfg, Box::new(rec.clone()));
    assert!(ExportSession::new(cfg, backend, CancellationToken::new()).is_err());
    assert_eq!(rec.state(), RecorderState::Idle);
}

#[test]
fn closures_observe_events() {
    let seen = std::sync::Mutex::new(Vec::new());
    let obs = |e: &ExportEvent| seen.lock().unwrap().push(e.clone());
    obs.on_event(&ExportEvent::Started { scenes: 3 });
    obs.on_event(&ExportEvent::Finalizing);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![ExportEvent::Started { scenes: 3 }, ExportEvent::Finalizing]
    );
}
