use super::*;

struct FixedPlanner(Vec<PlanItem>);

#[async_trait]
impl Planner for FixedPlanner {
    async fn plan(
        &self,
        _document_text: &str,
        _file: Option<&DocumentFile>,
    ) -> ReelResult<Vec<PlanItem>> {
        Ok(self.0.clone())
    }
}

#[test]
fn parse_maps_unknown_visual_tags_to_image() {
    let items = parse_plan_response(
        r#"[
            {"script": "a", "visualPrompt": "pa", "visualType": "VIDEO"},
            {"script": "b", "visualPrompt": "pb", "visualType": "IMAGE"},
            {"script": "c", "visualPrompt": "pc", "visualType": "GIF"}
        ]"#,
    )
    .unwrap();
    let kinds: Vec<_> = items.iter().map(|i| i.visual_type).collect();
    assert_eq!(
        kinds,
        vec![VisualKind::Video, VisualKind::Image, VisualKind::Image]
    );
}

#[test]
fn parse_rejects_empty_and_malformed() {
    assert!(matches!(
        parse_plan_response("   "),
        Err(ReelError::Planning(_))
    ));
    assert!(matches!(
        parse_plan_response("[]"),
        Err(ReelError::Planning(_))
    ));
    assert!(matches!(
        parse_plan_response(r#"[{"script": "a"}]"#),
        Err(ReelError::Planning(_))
    ));
    assert!(matches!(
        parse_plan_response("{not json"),
        Err(ReelError::Planning(_))
    ));
}

#[test]
fn from_plan_numbers_scenes_from_one() {
    let board = Storyboard::from_plan(vec![
        PlanItem {
            script: "a".into(),
            visual_prompt: "pa".into(),
            visual_type: VisualKind::Image,
        },
        PlanItem {
            script: "b".into(),
            visual_prompt: "pb".into(),
            visual_type: VisualKind::Video,
        },
    ]);
    assert_eq!(board.scenes[0].frame_number, 1);
    assert_eq!(board.scenes[1].frame_number, 2);
    assert_ne!(board.scenes[0].id, board.scenes[1].id);
    assert!(board.scenes.iter().all(|s| s.audio_url.is_none()));
}

#[tokio::test]
async fn plan_storyboard_requires_content() {
    let planner = FixedPlanner(vec![]);
    let err = plan_storyboard(&planner, "  ", None).await.unwrap_err();
    assert!(err.to_string().contains("no content provided"));
}

#[tokio::test]
async fn plan_storyboard_accepts_file_only() {
    let planner = FixedPlanner(vec![PlanItem {
        script: "a".into(),
        visual_prompt: "pa".into(),
        visual_type: VisualKind::Image,
    }]);
    let file = DocumentFile {
        mime_type: "application/pdf".into(),
        bytes: b"%PDF-1.7".to_vec(),
    };
    let board = plan_storyboard(&planner, "", Some(&file)).await.unwrap();
    assert_eq!(board.len(), 1);
}

#[tokio::test]
async fn plan_storyboard_rejects_empty_plan() {
    let planner = FixedPlanner(vec![]);
    assert!(plan_storyboard(&planner, "doc", None).await.is_err());
}
