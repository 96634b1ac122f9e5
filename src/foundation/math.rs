pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Blend straight-alpha `src` over an opaque background, returning an opaque pixel.
pub(crate) fn flatten_over(src: [u8; 4], bg: [u8; 4]) -> [u8; 4] {
    let a = u16::from(src[3]);
    if a == 255 {
        return [src[0], src[1], src[2], 255];
    }
    let inv = 255 - a;
    let mix = |s: u8, b: u8| {
        (mul_div255_u16(u16::from(s), a) + mul_div255_u16(u16::from(b), inv)).min(255) as u8
    };
    [mix(src[0], bg[0]), mix(src[1], bg[1]), mix(src[2], bg[2]), 255]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
