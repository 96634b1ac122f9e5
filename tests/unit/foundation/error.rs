use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::config("x").to_string().contains("config error:"));
    assert!(
        ReelError::planning("x")
            .to_string()
            .contains("planning error:")
    );
    assert!(ReelError::session("x").to_string().contains("session error:"));
    assert!(ReelError::encode("x").to_string().contains("encode error:"));
    assert!(ReelError::persist("x").to_string().contains("persist error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn missing_asset_names_both_slots() {
    let err = SceneError::MissingAsset(vec![AssetSlot::Audio, AssetSlot::Visual]);
    assert_eq!(err.to_string(), "missing audio and visual");
    let err = SceneError::MissingAsset(vec![AssetSlot::Visual]);
    assert_eq!(err.to_string(), "missing visual");
}

#[test]
fn fetch_error_mentions_slot() {
    let err = SceneError::fetch(AssetSlot::Audio, "no such file");
    assert!(err.to_string().contains("fetch audio failed"));
}
