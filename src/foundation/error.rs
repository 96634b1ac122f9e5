/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Session-level error.
///
/// Anything surfaced through this type aborts the export it came from. Scene-level problems are
/// reported through [`SceneError`] and never reach the caller as an `Err`.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid input or parameter.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Planner call failed or returned an unusable response.
    #[error("planning error: {0}")]
    Planning(String),

    /// Export session could not start or had nothing to render.
    #[error("session error: {0}")]
    Session(String),

    /// Recorder / encoder failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Writing the finished file failed.
    #[error("persist error: {0}")]
    Persist(String),

    /// Anything else, with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ReelError::Planning`].
    pub fn planning(msg: impl Into<String>) -> Self {
        Self::Planning(msg.into())
    }

    /// Build a [`ReelError::Session`].
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Build a [`ReelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Persist`].
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }
}

/// Which of a scene's two assets a message refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    /// Narration audio.
    Audio,
    /// Image or video visual.
    Visual,
}

impl std::fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Visual => f.write_str("visual"),
        }
    }
}

/// Recoverable per-scene failure. The scene is skipped and the export continues.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// One or both asset references are unset.
    #[error("missing {}", join_slots(.0))]
    MissingAsset(Vec<AssetSlot>),

    /// The asset bytes could not be fetched.
    #[error("fetch {slot} failed: {msg}")]
    Fetch {
        /// Asset the fetch was for.
        slot: AssetSlot,
        /// Underlying failure.
        msg: String,
    },

    /// Audio bytes are absent, truncated or not valid encoded audio.
    #[error("audio decode failed: {0}")]
    Decode(String),

    /// The visual could not be loaded.
    #[error("visual load failed: {0}")]
    VisualLoad(String),
}

impl SceneError {
    /// Build a [`SceneError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SceneError::VisualLoad`].
    pub fn visual_load(msg: impl Into<String>) -> Self {
        Self::VisualLoad(msg.into())
    }

    /// Build a [`SceneError::Fetch`].
    pub fn fetch(slot: AssetSlot, msg: impl Into<String>) -> Self {
        Self::Fetch {
            slot,
            msg: msg.into(),
        }
    }
}

fn join_slots(slots: &[AssetSlot]) -> String {
    let names: Vec<String> = slots.iter().map(ToString::to_string).collect();
    names.join(" and ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
