//! Per-scene visual strategies drawing onto the session surface.

pub(crate) mod image;
pub(crate) mod surface;
pub(crate) mod video;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{ReelResult, SceneError};
use crate::scene::model::VisualKind;
use surface::RenderSurface;

/// Where a visual's encoded bytes come from.
#[derive(Clone, Debug)]
pub enum VisualSource {
    /// Bytes already in memory (data URIs, remote fetches).
    Bytes(Vec<u8>),
    /// A readable file.
    Path(PathBuf),
}

/// Output parameters every strategy draws for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawTarget {
    /// Surface size.
    pub canvas: Canvas,
    /// Letterbox bar colour.
    pub fill: Rgba8,
    /// Frame rate the surface is sampled at.
    pub fps: Fps,
}

/// Draws one scene's visual.
///
/// The sequencer calls `prepare` once, `draw_frame` once per media-clock tick, and `release`
/// exactly once afterwards, whether the scene finished, failed or was abandoned.
#[async_trait]
pub trait VisualStrategy: Send {
    /// Kind of visual this strategy draws.
    fn kind(&self) -> VisualKind;

    /// Load and decode. Failure skips the scene.
    async fn prepare(&mut self) -> Result<(), SceneError>;

    /// Write the current frame onto `surface`.
    async fn draw_frame(&mut self, surface: &mut RenderSurface) -> ReelResult<()>;

    /// Stop playback and free decoder resources.
    async fn release(&mut self);
}

/// Builds a strategy for a scene's visual.
pub trait VisualLoader: Send + Sync {
    /// Create an unprepared strategy.
    fn create(
        &self,
        kind: VisualKind,
        source: VisualSource,
        target: DrawTarget,
    ) -> Box<dyn VisualStrategy>;
}

/// Loader producing [`image::ImageVisual`] and [`video::VideoVisual`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultVisualLoader;

impl VisualLoader for DefaultVisualLoader {
    fn create(
        &self,
        kind: VisualKind,
        source: VisualSource,
        target: DrawTarget,
    ) -> Box<dyn VisualStrategy> {
        match kind {
            VisualKind::Image => Box::new(image::ImageVisual::new(source, target)),
            VisualKind::Video => Box::new(video::VideoVisual::new(source, target)),
        }
    }
}
