use super::*;

#[test]
fn mul_div255_bounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
}

#[test]
fn flatten_alpha_0_returns_bg() {
    assert_eq!(flatten_over([200, 100, 50, 0], [10, 20, 30, 255]), [10, 20, 30, 255]);
}

#[test]
fn flatten_alpha_255_is_identity() {
    assert_eq!(flatten_over([1, 2, 3, 255], [10, 20, 30, 255]), [1, 2, 3, 255]);
}

#[test]
fn flatten_half_alpha_mixes() {
    let out = flatten_over([255, 255, 255, 128], [0, 0, 0, 255]);
    assert_eq!(out[3], 255);
    assert!(out[0] > 120 && out[0] < 135);
}
