use super::*;
use std::sync::Mutex;

struct Scripted {
    interactive: bool,
    answer: Mutex<Option<Option<String>>>,
}

impl Scripted {
    fn new(answer: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            interactive: true,
            answer: Mutex::new(Some(answer.map(str::to_string))),
        })
    }
}

impl Prompt for Scripted {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&self, _question: &str, _default: &str) -> std::io::Result<Option<String>> {
        Ok(self.answer.lock().unwrap().take().flatten())
    }
}

fn blob() -> OutputBlob {
    OutputBlob {
        mime_type: "video/webm".to_string(),
        bytes: b"webm".to_vec(),
    }
}

#[test]
fn destination_rules() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    assert_eq!(destination("", d, "r.webm"), Some(d.join("r.webm")));
    assert_eq!(destination("Q", d, "r.webm"), None);
    assert_eq!(destination("x.webm", d, "r.webm"), Some(d.join("x.webm")));
    assert_eq!(
        destination(&d.display().to_string(), Path::new("/elsewhere"), "r.webm"),
        Some(d.join("r.webm"))
    );
}

#[tokio::test]
async fn enter_accepts_suggested_location() {
    let dir = tempfile::tempdir().unwrap();
    let picker = InteractivePicker::with_prompt(dir.path(), Scripted::new(Some("")));
    assert!(picker.is_available());
    let out = picker.save(&blob(), "VideoReport.webm").await.unwrap();
    let path = dir.path().join("VideoReport.webm");
    assert_eq!(out, SaveOutcome::Saved(path.clone()));
    assert_eq!(std::fs::read(path).unwrap(), b"webm");
}

#[tokio::test]
async fn q_and_closed_input_dismiss_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    for answer in [Some("q"), None] {
        let picker = InteractivePicker::with_prompt(dir.path(), Scripted::new(answer));
        let out = picker.save(&blob(), "VideoReport.webm").await.unwrap();
        assert_eq!(out, SaveOutcome::Dismissed);
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn write_failure_is_a_persist_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let picker = InteractivePicker::with_prompt(dir.path(), Scripted::new(Some("file/out.webm")));
    let err = picker.save(&blob(), "VideoReport.webm").await.unwrap_err();
    assert!(matches!(err, ReelError::Persist(_)));
}
