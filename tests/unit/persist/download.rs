use super::*;

fn blob(bytes: &[u8]) -> OutputBlob {
    OutputBlob {
        mime_type: "video/webm".to_string(),
        bytes: bytes.to_vec(),
    }
}

#[test]
fn unique_path_numbers_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        unique_path(dir.path(), "VideoReport.webm"),
        dir.path().join("VideoReport.webm")
    );
    std::fs::write(dir.path().join("VideoReport.webm"), b"x").unwrap();
    std::fs::write(dir.path().join("VideoReport (1).webm"), b"x").unwrap();
    assert_eq!(
        unique_path(dir.path(), "VideoReport.webm"),
        dir.path().join("VideoReport (2).webm")
    );
}

#[tokio::test]
async fn saves_without_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let dl = AutoDownload::new(dir.path().join("out"));
    assert!(dl.is_available());

    let first = dl.save(&blob(b"one"), "r.webm").await.unwrap();
    let second = dl.save(&blob(b"two"), "r.webm").await.unwrap();
    let (SaveOutcome::Saved(a), SaveOutcome::Saved(b)) = (first, second) else {
        panic!("expected two saves");
    };
    assert_ne!(a, b);
    assert_eq!(std::fs::read(&a).unwrap(), b"one");
    assert_eq!(std::fs::read(&b).unwrap(), b"two");
    assert!(b.ends_with("r (1).webm"));
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = AutoDownload::new(dir.path())
        .save(&blob(b""), " ")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("persist error:"));
}
