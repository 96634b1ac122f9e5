use super::*;
use crate::foundation::core::Rgba8;

fn cfg() -> RecorderConfig {
    RecorderConfig {
        canvas: Canvas {
            width: 4,
            height: 2,
        },
        fps: Fps::default(),
        sample_rate: 48_000,
        channels: 2,
        video_codec: "libvpx-vp9".to_string(),
        audio_codec: "libopus".to_string(),
    }
}

#[tokio::test]
async fn records_frames_and_audio_in_order() {
    let mut rec = InMemoryRecorder::new();
    let handle = rec.clone();
    rec.start(cfg()).await.unwrap();

    let surface = RenderSurface::new(cfg().canvas, Rgba8::BLACK);
    rec.write_video(FrameIndex(0), &surface).await.unwrap();
    rec.write_video(FrameIndex(1), &surface).await.unwrap();
    rec.write_audio(&[0.1, 0.2, 0.3, 0.4]).await.unwrap();

    assert_eq!(handle.state(), RecorderState::Recording);
    assert_eq!(handle.frame_count(), 2);
    assert_eq!(handle.audio_frames(), 2);

    let media = rec.stop().await.unwrap();
    assert_eq!(media.mime_type, MEMORY_MIME);
    assert_eq!(media.chunks.len(), 3);
    assert_eq!(handle.state(), RecorderState::Stopped);
}

#[tokio::test]
async fn rejects_out_of_order_frames_and_writes_before_start() {
    let mut rec = InMemoryRecorder::new();
    let surface = RenderSurface::new(cfg().canvas, Rgba8::BLACK);
    assert!(rec.write_video(FrameIndex(0), &surface).await.is_err());
    assert!(rec.write_audio(&[0.0]).await.is_err());
    assert!(rec.stop().await.is_err());

    rec.start(cfg()).await.unwrap();
    rec.write_video(FrameIndex(3), &surface).await.unwrap();
    assert!(rec.write_video(FrameIndex(3), &surface).await.is_err());
}

#[tokio::test]
async fn abort_only_affects_a_running_session() {
    let mut rec = InMemoryRecorder::new();
    rec.abort();
    assert_eq!(rec.state(), RecorderState::Idle);

    rec.start(cfg()).await.unwrap();
    rec.abort();
    assert_eq!(rec.state(), RecorderState::Aborted);
    assert_eq!(rec.start_count(), 1);
}
