use super::*;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use std::io::Cursor;

fn target(w: u32, h: u32) -> DrawTarget {
    DrawTarget {
        canvas: Canvas {
            width: w,
            height: h,
        },
        fill: Rgba8::BLACK,
        fps: Fps::default(),
    }
}

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = ::image::RgbaImage::from_pixel(w, h, ::image::Rgba(px));
    let mut buf = Vec::new();
    ::image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ::image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn square_image_is_pillarboxed() {
    let frame = render_fitted(&png(2, 2, [255, 0, 0, 255]), target(8, 4)).unwrap();
    let px = |x: usize, y: usize| {
        let i = (y * 8 + x) * 4;
        [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
    };
    assert_eq!(px(0, 0), [0, 0, 0, 255]);
    assert_eq!(px(3, 2), [255, 0, 0, 255]);
    assert_eq!(px(7, 3), [0, 0, 0, 255]);
}

#[test]
fn transparent_pixels_are_flattened_over_fill() {
    let frame = render_fitted(&png(4, 2, [255, 255, 255, 0]), target(4, 2)).unwrap();
    assert!(frame.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn garbage_bytes_fail_to_load() {
    let err = render_fitted(b"not an image", target(4, 2)).unwrap_err();
    assert!(matches!(err, SceneError::VisualLoad(_)));
}

#[tokio::test]
async fn draws_once_then_holds() {
    let t = target(4, 2);
    let mut v = ImageVisual::new(VisualSource::Bytes(png(4, 2, [0, 255, 0, 255])), t);
    v.prepare().await.unwrap();

    let mut s = RenderSurface::new(t.canvas, t.fill);
    v.draw_frame(&mut s).await.unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 255, 0, 255]));

    // Later ticks leave the surface untouched.
    s.clear();
    v.draw_frame(&mut s).await.unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 255]));
    v.release().await;
}

#[tokio::test]
async fn missing_file_fails_prepare() {
    let mut v = ImageVisual::new(VisualSource::Path("/no/such/image.png".into()), target(4, 2));
    assert!(v.prepare().await.is_err());
}
