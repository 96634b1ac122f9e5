use crate::foundation::error::{ReelError, ReelResult};
use std::io::Write;

/// Convert interleaved PCM between channel layouts.
///
/// Mono is duplicated into every output channel. Any layout folds to mono by averaging. Layouts
/// wider than stereo fold to stereo by averaging even channels into left and odd into right.
pub(crate) fn remix(samples: &[f32], src_channels: u16, dst_channels: u16) -> Vec<f32> {
    let src_ch = usize::from(src_channels.max(1));
    let dst_ch = usize::from(dst_channels.max(1));
    if src_ch == dst_ch {
        return samples.to_vec();
    }

    let frames = samples.len() / src_ch;
    let mut out = Vec::with_capacity(frames * dst_ch);
    for frame in samples.chunks_exact(src_ch) {
        match (src_ch, dst_ch) {
            (1, _) => out.extend(std::iter::repeat_n(frame[0], dst_ch)),
            (_, 1) => out.push(frame.iter().sum::<f32>() / src_ch as f32),
            _ => {
                let (mut l, mut nl, mut r, mut nr) = (0.0f32, 0u32, 0.0f32, 0u32);
                for (i, &v) in frame.iter().enumerate() {
                    if i % 2 == 0 {
                        l += v;
                        nl += 1;
                    } else {
                        r += v;
                        nr += 1;
                    }
                }
                out.push(l / nl.max(1) as f32);
                out.push(r / nr.max(1) as f32);
                // Output channels past stereo stay silent.
                out.extend(std::iter::repeat_n(0.0, dst_ch.saturating_sub(2)));
            }
        }
    }
    out
}

/// Linearly resample interleaved PCM from `src_rate` to `dst_rate`.
pub(crate) fn resample_linear(
    samples: &[f32],
    channels: u16,
    src_rate: u32,
    dst_rate: u32,
) -> Vec<f32> {
    let ch = usize::from(channels.max(1));
    if src_rate == dst_rate || src_rate == 0 {
        return samples.to_vec();
    }
    let src_frames = samples.len() / ch;
    if src_frames == 0 {
        return Vec::new();
    }

    let dst_frames = ((src_frames as u128 * u128::from(dst_rate) + u128::from(src_rate) / 2)
        / u128::from(src_rate)) as usize;
    let step = f64::from(src_rate) / f64::from(dst_rate);
    let mut out = Vec::with_capacity(dst_frames * ch);
    for i in 0..dst_frames {
        let src_pos = i as f64 * step;
        let f0 = (src_pos.floor() as usize).min(src_frames - 1);
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (src_pos - f0 as f64) as f32;
        for c in 0..ch {
            let v0 = samples[f0 * ch + c];
            let v1 = samples[f1 * ch + c];
            out.push(v0 + ((v1 - v0) * frac));
        }
    }
    out
}

pub(crate) fn clamp_in_place(samples: &mut [f32]) {
    for s in samples {
        *s = s.clamp(-1.0, 1.0);
    }
}

/// Append interleaved `f32` PCM as raw little-endian bytes.
pub(crate) fn write_f32le<W: Write>(w: &mut W, samples: &[f32]) -> ReelResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    w.write_all(&bytes)
        .map_err(|e| ReelError::encode(format!("failed to spool audio samples: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
