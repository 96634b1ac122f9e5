use crate::foundation::error::{AssetSlot, SceneError};
use crate::scene::model::{AssetRef, Scene, VisualKind};

/// A scene whose two asset references are both present.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedScene<'a> {
    /// Position in the input list.
    pub index: usize,
    /// The scene itself.
    pub scene: &'a Scene,
    /// Narration reference.
    pub audio: &'a AssetRef,
    /// Visual reference.
    pub visual: &'a AssetRef,
}

impl ResolvedScene<'_> {
    /// Visual kind of the scene.
    pub fn kind(&self) -> VisualKind {
        self.scene.visual_type
    }
}

/// List the assets `scene` is missing, audio first.
pub fn missing_assets(scene: &Scene) -> Vec<AssetSlot> {
    let mut missing = Vec::new();
    if scene.audio().is_none() {
        missing.push(AssetSlot::Audio);
    }
    if scene.visual().is_none() {
        missing.push(AssetSlot::Visual);
    }
    missing
}

/// Pair a scene with its audio and visual references.
///
/// A scene missing either asset is not rendered at all; the omission is logged here.
pub fn resolve(index: usize, scene: &Scene) -> Result<ResolvedScene<'_>, SceneError> {
    match (scene.audio(), scene.visual()) {
        (Some(audio), Some(visual)) => Ok(ResolvedScene {
            index,
            scene,
            audio,
            visual,
        }),
        _ => {
            let err = SceneError::MissingAsset(missing_assets(scene));
            tracing::warn!(
                scene = scene.frame_number,
                id = %scene.id,
                "skipping scene: {err}"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
