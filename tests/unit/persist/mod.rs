use super::*;
use std::sync::Mutex;

fn blob() -> OutputBlob {
    OutputBlob::assemble(RecordedMedia {
        mime_type: "video/webm".to_string(),
        chunks: vec![vec![1, 2], vec![], vec![3]],
    })
}

#[test]
fn assemble_concatenates_chunks_in_order() {
    let b = blob();
    assert_eq!(b.bytes, vec![1, 2, 3]);
    assert_eq!(b.mime_type, "video/webm");
    assert_eq!(b.len(), 3);
    assert!(!b.is_empty());
}

struct Recording {
    name: &'static str,
    available: bool,
    saved: Mutex<Vec<String>>,
}

impl Recording {
    fn new(name: &'static str, available: bool) -> Self {
        Self {
            name,
            available,
            saved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PersistenceBackend for Recording {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn save(&self, _blob: &OutputBlob, suggested_name: &str) -> ReelResult<SaveOutcome> {
        self.saved.lock().unwrap().push(suggested_name.to_string());
        Ok(SaveOutcome::Saved(PathBuf::from(suggested_name)))
    }
}

#[tokio::test]
async fn prefers_picker_when_available() {
    let p = PreferredPersistence::new(Recording::new("picker", true), Recording::new("dl", true));
    assert_eq!(p.name(), "picker");
    p.save(&blob(), "a.webm").await.unwrap();
    assert_eq!(p.picker.saved.lock().unwrap().len(), 1);
    assert!(p.fallback.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn falls_back_when_picker_unavailable() {
    let p = PreferredPersistence::new(Recording::new("picker", false), Recording::new("dl", true));
    assert_eq!(p.name(), "dl");
    let out = p.save(&blob(), "a.webm").await.unwrap();
    assert_eq!(out, SaveOutcome::Saved(PathBuf::from("a.webm")));
    assert!(p.picker.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn errors_when_nothing_is_available() {
    let p = PreferredPersistence::new(Recording::new("a", false), Recording::new("b", false));
    assert!(!p.is_available());
    let err = p.save(&blob(), "a.webm").await.unwrap_err();
    assert!(matches!(err, ReelError::Persist(_)));
}
