use async_trait::async_trait;
use kurbo::Size;

use crate::foundation::error::{ReelResult, SceneError};
use crate::foundation::math::flatten_over;
use crate::scene::model::VisualKind;
use crate::visual::surface::{RenderSurface, fit_contain};
use crate::visual::{DrawTarget, VisualSource, VisualStrategy};

enum ImageState {
    Loading(VisualSource),
    Ready(Vec<u8>),
    Held,
    Released,
}

/// Still image drawn once and held for the whole scene.
pub struct ImageVisual {
    target: DrawTarget,
    state: ImageState,
}

impl ImageVisual {
    /// Create an unprepared image visual.
    pub fn new(source: VisualSource, target: DrawTarget) -> Self {
        Self {
            target,
            state: ImageState::Loading(source),
        }
    }
}

/// Decode `bytes` and letterbox the result into a full-surface opaque frame.
pub(crate) fn render_fitted(bytes: &[u8], target: DrawTarget) -> Result<Vec<u8>, SceneError> {
    let img = ::image::load_from_memory(bytes)
        .map_err(|e| SceneError::visual_load(format!("decode image: {e}")))?
        .to_rgba8();
    let (sw, sh) = img.dimensions();
    if sw == 0 || sh == 0 {
        return Err(SceneError::visual_load("image has zero size"));
    }

    let canvas = target.canvas;
    let rect = fit_contain(
        Size::new(f64::from(sw), f64::from(sh)),
        canvas.size(),
    );
    let (fw, fh) = (rect.width() as u32, rect.height() as u32);
    let (x0, y0) = (rect.x0 as u32, rect.y0 as u32);
    let scaled = ::image::imageops::resize(&img, fw, fh, ::image::imageops::FilterType::Triangle);

    let bg = [target.fill.r, target.fill.g, target.fill.b, 255];
    let mut frame = Vec::with_capacity(canvas.rgba_len());
    for _ in 0..(canvas.width as usize * canvas.height as usize) {
        frame.extend_from_slice(&bg);
    }
    let stride = canvas.width as usize * 4;
    for (y, row) in scaled.rows().enumerate() {
        let base = (y0 as usize + y) * stride + x0 as usize * 4;
        for (x, px) in row.enumerate() {
            let i = base + x * 4;
            frame[i..i + 4].copy_from_slice(&flatten_over(px.0, bg));
        }
    }
    Ok(frame)
}

#[async_trait]
impl VisualStrategy for ImageVisual {
    fn kind(&self) -> VisualKind {
        VisualKind::Image
    }

    async fn prepare(&mut self) -> Result<(), SceneError> {
        if !matches!(self.state, ImageState::Loading(_)) {
            return Ok(());
        }
        let ImageState::Loading(source) = std::mem::replace(&mut self.state, ImageState::Held)
        else {
            return Ok(());
        };
        let target = self.target;
        let frame = tokio::task::spawn_blocking(move || {
            let bytes = match source {
                VisualSource::Bytes(b) => b,
                VisualSource::Path(p) => std::fs::read(&p).map_err(|e| {
                    SceneError::visual_load(format!("read '{}': {e}", p.display()))
                })?,
            };
            render_fitted(&bytes, target)
        })
        .await
        .map_err(|e| SceneError::visual_load(format!("image decode task failed: {e}")))??;
        self.state = ImageState::Ready(frame);
        Ok(())
    }

    async fn draw_frame(&mut self, surface: &mut RenderSurface) -> ReelResult<()> {
        if matches!(self.state, ImageState::Ready(_))
            && let ImageState::Ready(frame) =
                std::mem::replace(&mut self.state, ImageState::Held)
        {
            surface.copy_from(&frame)?;
        }
        Ok(())
    }

    async fn release(&mut self) {
        self.state = ImageState::Released;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visual/image.rs"]
mod tests;
