use std::hash::{Hash, Hasher};

use kurbo::{Rect, Size};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};

/// The single RGBA8 drawing surface of an export session.
#[derive(Clone, Debug)]
pub struct RenderSurface {
    canvas: Canvas,
    fill: Rgba8,
    data: Vec<u8>,
}

impl RenderSurface {
    /// Allocate a surface cleared to `fill`.
    pub fn new(canvas: Canvas, fill: Rgba8) -> Self {
        let mut s = Self {
            canvas,
            fill,
            data: vec![0; canvas.rgba_len()],
        };
        s.clear();
        s
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Neutral fill colour (opaque).
    pub fn fill(&self) -> Rgba8 {
        Rgba8 { a: 255, ..self.fill }
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reset every pixel to the fill colour.
    pub fn clear(&mut self) {
        let px = self.fill().to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Replace the whole surface with a frame of identical size.
    pub fn copy_from(&mut self, frame: &[u8]) -> ReelResult<()> {
        if frame.len() != self.data.len() {
            return Err(ReelError::validation(format!(
                "frame has {} bytes, surface expects {}",
                frame.len(),
                self.data.len()
            )));
        }
        self.data.copy_from_slice(frame);
        Ok(())
    }

    /// Content hash, used to compare frames without keeping them.
    pub fn fingerprint(&self) -> u64 {
        let mut h = std::collections::hash_map::DefaultHasher::new();
        self.data.hash(&mut h);
        h.finish()
    }

    /// Read one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = (y as usize * self.canvas.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Letterbox ("contain") placement of `src` inside `dst`, snapped to whole pixels.
///
/// Aspect ratio is preserved and the result is centered; the uncovered bands are left to the fill.
pub fn fit_contain(src: Size, dst: Size) -> Rect {
    if src.width <= 0.0 || src.height <= 0.0 {
        return Rect::ZERO;
    }
    let scale = (dst.width / src.width).min(dst.height / src.height);
    let w = (src.width * scale).round().clamp(1.0, dst.width);
    let h = (src.height * scale).round().clamp(1.0, dst.height);
    let x0 = ((dst.width - w) / 2.0).floor();
    let y0 = ((dst.height - h) / 2.0).floor();
    Rect::new(x0, y0, x0 + w, y0 + h)
}

#[cfg(test)]
#[path = "../../tests/unit/visual/surface.rs"]
mod tests;
