use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::error::{ReelError, ReelResult};
use crate::persist::{OutputBlob, PersistenceBackend, SaveOutcome, write_blob};

/// Source of answers for [`InteractivePicker`].
pub trait Prompt: Send + Sync {
    /// Whether a person can answer.
    fn is_interactive(&self) -> bool;

    /// Ask `question` showing `default`. `Ok(None)` means the input was closed.
    fn ask(&self, question: &str, default: &str) -> std::io::Result<Option<String>>;
}

/// Prompt on stderr, answer on stdin.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }

    fn ask(&self, question: &str, default: &str) -> std::io::Result<Option<String>> {
        let mut err = std::io::stderr().lock();
        write!(err, "{question} [{default}] (q to cancel): ")?;
        err.flush()?;
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Asks the user where to save.
///
/// Pressing enter accepts the suggested location; `q` or closing the input dismisses the save.
#[derive(Clone)]
pub struct InteractivePicker {
    start_dir: PathBuf,
    prompt: Arc<dyn Prompt>,
}

impl InteractivePicker {
    /// Picker on the process terminal, suggesting files in `start_dir`.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self::with_prompt(start_dir, Arc::new(TerminalPrompt))
    }

    /// Picker with a custom answer source.
    pub fn with_prompt(start_dir: impl Into<PathBuf>, prompt: Arc<dyn Prompt>) -> Self {
        Self {
            start_dir: start_dir.into(),
            prompt,
        }
    }
}

/// Map a typed answer to a destination. `None` is a dismissal.
pub(crate) fn destination(answer: &str, start_dir: &Path, suggested: &str) -> Option<PathBuf> {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("q") {
        return None;
    }
    if answer.is_empty() {
        return Some(start_dir.join(suggested));
    }
    let p = Path::new(answer);
    let p = if p.is_absolute() {
        p.to_path_buf()
    } else {
        start_dir.join(p)
    };
    if p.is_dir() {
        Some(p.join(suggested))
    } else {
        Some(p)
    }
}

#[async_trait]
impl PersistenceBackend for InteractivePicker {
    fn name(&self) -> &'static str {
        "picker"
    }

    fn is_available(&self) -> bool {
        self.prompt.is_interactive()
    }

    async fn save(&self, blob: &OutputBlob, suggested_name: &str) -> ReelResult<SaveOutcome> {
        let prompt = Arc::clone(&self.prompt);
        let default_shown = self.start_dir.join(suggested_name).display().to_string();
        let answer = tokio::task::spawn_blocking(move || {
            prompt.ask("Save video report as", &default_shown)
        })
        .await
        .map_err(|e| ReelError::persist(format!("picker task failed: {e}")))?
        .map_err(|e| ReelError::persist(format!("read destination: {e}")))?;

        let Some(path) = answer
            .as_deref()
            .and_then(|a| destination(a, &self.start_dir, suggested_name))
        else {
            tracing::info!("save dismissed");
            return Ok(SaveOutcome::Dismissed);
        };
        write_blob(&path, blob).await?;
        Ok(SaveOutcome::Saved(path))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/picker.rs"]
mod tests;
