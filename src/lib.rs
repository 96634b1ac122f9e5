//! storyreel turns a storyboard of narrated scenes into one continuous video.
//!
//! Each scene pairs a narration clip with a still image or a short looping clip. Export is
//! session-oriented:
//!
//! - Load a [`Storyboard`] (or plan one with a [`Planner`] and fill it with [`generate_media`])
//! - Create an [`ExportSession`] from an [`ExportConfig`] and a [`MediaBackend`]
//! - Run it; scenes are rendered in order against the narration's sample clock, recorded by a
//!   [`Recorder`], and handed to a [`PersistenceBackend`]
//!
//! [`export_video`] wraps those steps in a single call.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod audio;
mod capture;
mod config;
mod encode;
mod foundation;
mod persist;
mod scene;
mod session;
mod visual;

pub use crate::foundation::core::{
    Canvas, Fps, FrameIndex, Rgba8, frame_to_sample, ms_to_samples, samples_to_duration,
};
pub use crate::foundation::error::{AssetSlot, ReelError, ReelResult, SceneError};

pub use crate::config::{ExportConfig, MAX_SCENE_GAP_MS, Pacing};

pub use crate::scene::generate::{
    GenerationSummary, ImageGenerator, MediaGenerators, SpeechSynthesizer, VideoGenerator,
    generate_media,
};
pub use crate::scene::model::{AssetRef, Scene, Storyboard, VisualKind};
pub use crate::scene::plan::{
    DocumentFile, PlanItem, Planner, parse_plan_response, plan_storyboard,
};

pub use crate::assets::fetch::{AssetFetcher, LocalFetcher};
pub use crate::assets::media::is_ffmpeg_on_path;
pub use crate::assets::resolve::{ResolvedScene, missing_assets, resolve};

pub use crate::audio::decode::{
    AudioDecoder, AudioFormat, DecodedAudio, PcmDecoder, decode_scene_audio,
};
pub use crate::audio::graph::{AudioGraph, SourceId};

pub use crate::visual::image::ImageVisual;
pub use crate::visual::surface::{RenderSurface, fit_contain};
pub use crate::visual::video::VideoVisual;
pub use crate::visual::{DefaultVisualLoader, DrawTarget, VisualLoader, VisualSource, VisualStrategy};

pub use crate::capture::CapturePipeline;
pub use crate::encode::ffmpeg::{FfmpegRecorder, WEBM_MIME};
pub use crate::encode::recorder::{
    InMemoryRecorder, MEMORY_MIME, RecordedMedia, Recorder, RecorderConfig, RecorderState,
};

pub use crate::persist::download::AutoDownload;
pub use crate::persist::picker::{InteractivePicker, Prompt, TerminalPrompt};
pub use crate::persist::{OutputBlob, PersistenceBackend, PreferredPersistence, SaveOutcome};

pub use crate::session::clock::MediaClock;
pub use crate::session::export::{
    ExportEvent, ExportObserver, ExportOutcome, ExportReport, ExportSession, MediaBackend,
    SceneReport, SceneStatus, export_video,
};
