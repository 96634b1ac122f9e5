use super::*;

#[test]
fn resolves_complete_scene() {
    let s = Scene::new(1, "s", "p", VisualKind::Video).with_assets("a.wav", "v.mp4");
    let r = resolve(0, &s).unwrap();
    assert_eq!(r.audio.as_str(), "a.wav");
    assert_eq!(r.visual.as_str(), "v.mp4");
    assert_eq!(r.kind(), VisualKind::Video);
}

#[test]
fn blank_refs_count_as_missing() {
    let mut s = Scene::new(2, "s", "p", VisualKind::Image).with_assets("a.wav", "   ");
    assert_eq!(missing_assets(&s), vec![AssetSlot::Visual]);
    assert_eq!(
        resolve(1, &s).unwrap_err(),
        SceneError::MissingAsset(vec![AssetSlot::Visual])
    );

    s.audio_url = None;
    assert_eq!(missing_assets(&s), vec![AssetSlot::Audio, AssetSlot::Visual]);
}
