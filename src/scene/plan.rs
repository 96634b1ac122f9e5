use async_trait::async_trait;

use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::model::{Scene, Storyboard, VisualKind};

/// One planned scene as returned by the planner.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    /// Narration text.
    pub script: String,
    /// Visual description for the generator.
    pub visual_prompt: String,
    /// Requested visual kind.
    #[serde(deserialize_with = "de_visual_tag")]
    pub visual_type: VisualKind,
}

fn de_visual_tag<'de, D>(d: D) -> Result<VisualKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let tag: String = serde::Deserialize::deserialize(d)?;
    Ok(VisualKind::from_plan_tag(&tag))
}

/// Raw document attached to a planning request (for example a PDF).
#[derive(Clone, Debug)]
pub struct DocumentFile {
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Scene-planning collaborator.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Turn document text and/or an attached file into an ordered scene plan.
    async fn plan(&self, document_text: &str, file: Option<&DocumentFile>)
    -> ReelResult<Vec<PlanItem>>;
}

/// Parse a planner's JSON response.
///
/// The response must be a non-empty array of `{script, visualPrompt, visualType}` objects.
pub fn parse_plan_response(text: &str) -> ReelResult<Vec<PlanItem>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ReelError::planning("planner returned an empty response"));
    }
    let items: Vec<PlanItem> = serde_json::from_str(trimmed)
        .map_err(|e| ReelError::planning(format!("malformed plan response: {e}")))?;
    if items.is_empty() {
        return Err(ReelError::planning("planner returned no scenes"));
    }
    Ok(items)
}

impl Storyboard {
    /// Build a storyboard from plan items, numbering scenes from 1.
    pub fn from_plan(items: Vec<PlanItem>) -> Self {
        let scenes = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                Scene::new(
                    (i + 1) as u32,
                    item.script,
                    item.visual_prompt,
                    item.visual_type,
                )
            })
            .collect();
        Self::new(scenes)
    }
}

/// Run the planner and build a fresh storyboard.
#[tracing::instrument(skip_all, fields(text_len = document_text.len(), has_file = file.is_some()))]
pub async fn plan_storyboard(
    planner: &dyn Planner,
    document_text: &str,
    file: Option<&DocumentFile>,
) -> ReelResult<Storyboard> {
    if document_text.trim().is_empty() && file.is_none() {
        return Err(ReelError::planning("no content provided"));
    }
    let items = planner.plan(document_text, file).await?;
    if items.is_empty() {
        return Err(ReelError::planning("planner returned no scenes"));
    }
    tracing::info!(scenes = items.len(), "storyboard planned");
    Ok(Storyboard::from_plan(items))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/plan.rs"]
mod tests;
