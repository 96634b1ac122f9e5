use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

#[test]
fn new_surface_is_cleared_to_opaque_fill() {
    let fill = Rgba8 {
        r: 10,
        g: 20,
        b: 30,
        a: 0,
    };
    let s = RenderSurface::new(canvas(4, 2), fill);
    assert_eq!(s.data().len(), 32);
    assert_eq!(s.pixel(3, 1), Some([10, 20, 30, 255]));
    assert_eq!(s.pixel(4, 0), None);
}

#[test]
fn copy_from_checks_size_and_changes_fingerprint() {
    let mut s = RenderSurface::new(canvas(2, 2), Rgba8::BLACK);
    let before = s.fingerprint();
    assert!(s.copy_from(&[0u8; 3]).is_err());
    s.copy_from(&[255u8; 16]).unwrap();
    assert_ne!(s.fingerprint(), before);
    s.clear();
    assert_eq!(s.fingerprint(), before);
}

#[test]
fn fit_contain_letterboxes_wide_and_pillarboxes_tall() {
    let dst = Size::new(1280.0, 720.0);

    let wide = fit_contain(Size::new(2000.0, 500.0), dst);
    assert_eq!(wide, Rect::new(0.0, 200.0, 1280.0, 520.0));

    let tall = fit_contain(Size::new(500.0, 1000.0), dst);
    assert_eq!(tall, Rect::new(460.0, 0.0, 820.0, 720.0));

    let same = fit_contain(Size::new(640.0, 360.0), dst);
    assert_eq!(same, Rect::new(0.0, 0.0, 1280.0, 720.0));

    assert_eq!(fit_contain(Size::new(0.0, 10.0), dst), Rect::ZERO);
}
