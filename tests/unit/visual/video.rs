use super::*;
use crate::foundation::core::{Canvas, Fps, Rgba8};

fn target() -> DrawTarget {
    DrawTarget {
        canvas: Canvas {
            width: 64,
            height: 36,
        },
        fill: Rgba8::from_hex("#102030").unwrap(),
        fps: Fps::new(30_000, 1001).unwrap(),
    }
}

#[test]
fn filter_letterboxes_with_fill_colour() {
    let f = letterbox_filter(target());
    assert!(f.starts_with("scale=64:36:force_original_aspect_ratio=decrease,"));
    assert!(f.contains("pad=64:36:(ow-iw)/2:(oh-ih)/2:color=0x102030"));
    assert!(f.ends_with("format=rgba"));
}

#[tokio::test]
async fn undecodable_clip_fails_prepare_and_release_is_idempotent() {
    let mut v = VideoVisual::new(VisualSource::Bytes(b"not a video".to_vec()), target());
    let err = v.prepare().await.unwrap_err();
    assert!(matches!(err, SceneError::VisualLoad(_)));

    let mut s = RenderSurface::new(target().canvas, target().fill);
    let before = s.fingerprint();
    v.draw_frame(&mut s).await.unwrap();
    assert_eq!(s.fingerprint(), before);
    v.release().await;
    v.release().await;
}
