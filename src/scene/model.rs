use crate::foundation::error::{ReelError, ReelResult};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// How a scene is visualized.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum VisualKind {
    /// A still image held for the whole scene.
    #[default]
    Image,
    /// A short clip played muted and looped for the whole scene.
    Video,
}

impl VisualKind {
    /// Map a planner tag to a kind. Anything other than `VIDEO` is an image.
    pub fn from_plan_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("video") {
            Self::Video
        } else {
            Self::Image
        }
    }
}

impl std::fmt::Display for VisualKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => f.write_str("IMAGE"),
            Self::Video => f.write_str("VIDEO"),
        }
    }
}

/// Opaque, fetchable reference to an encoded asset.
///
/// Accepted forms are decided by the [`AssetFetcher`](crate::AssetFetcher) in use; the default
/// fetcher understands filesystem paths, `file://` URLs and base64 `data:` URIs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Wrap a reference string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrow the raw reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the reference is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Short form for logs; `data:` URIs are not printed in full.
    pub fn display_short(&self) -> String {
        if let Some(rest) = self.0.strip_prefix("data:") {
            let mime = rest.split([';', ',']).next().unwrap_or("");
            return format!("data:{mime} ({} bytes)", self.0.len());
        }
        self.0.clone()
    }
}

impl From<&str> for AssetRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AssetRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One storyboard entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Stable identifier.
    pub id: String,
    /// 1-based position shown to users.
    pub frame_number: u32,
    /// Narration text.
    #[serde(default)]
    pub script: String,
    /// Prompt used to generate the visual.
    #[serde(default)]
    pub visual_prompt: String,
    /// Visual kind.
    #[serde(default)]
    pub visual_type: VisualKind,
    /// Synthesized narration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<AssetRef>,
    /// Generated image or clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_url: Option<AssetRef>,
    /// Last generation failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Scene {
    /// Create a scene without assets.
    pub fn new(
        frame_number: u32,
        script: impl Into<String>,
        visual_prompt: impl Into<String>,
        visual_type: VisualKind,
    ) -> Self {
        Self {
            id: format!("scene-{frame_number:03}"),
            frame_number,
            script: script.into(),
            visual_prompt: visual_prompt.into(),
            visual_type,
            audio_url: None,
            visual_url: None,
            error: None,
        }
    }

    /// Builder-style asset assignment.
    pub fn with_assets(mut self, audio: impl Into<AssetRef>, visual: impl Into<AssetRef>) -> Self {
        self.audio_url = Some(audio.into());
        self.visual_url = Some(visual.into());
        self
    }

    /// Narration reference when set and non-blank.
    pub fn audio(&self) -> Option<&AssetRef> {
        self.audio_url.as_ref().filter(|r| !r.is_blank())
    }

    /// Visual reference when set and non-blank.
    pub fn visual(&self) -> Option<&AssetRef> {
        self.visual_url.as_ref().filter(|r| !r.is_blank())
    }

    /// `true` when both assets are present.
    pub fn is_renderable(&self) -> bool {
        self.audio().is_some() && self.visual().is_some()
    }
}

/// Ordered list of scenes.
///
/// Serialized as a bare JSON array of scenes, the same shape the review UI edits.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Storyboard {
    /// Scenes in presentation order.
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    /// Wrap scenes.
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    /// Parse a storyboard from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let board: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::validation(format!("parse storyboard JSON: {e}")))?;
        board.validate()?;
        Ok(board)
    }

    /// Parse a storyboard from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open storyboard JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write the storyboard as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ReelResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            ReelError::validation(format!("create storyboard JSON '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)
            .map_err(|e| ReelError::validation(format!("write storyboard JSON: {e}")))
    }

    /// Reject duplicate scene ids.
    pub fn validate(&self) -> ReelResult<()> {
        let mut seen = HashSet::new();
        for scene in &self.scenes {
            if !seen.insert(scene.id.as_str()) {
                return Err(ReelError::validation(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
        }
        Ok(())
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// `true` when there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
