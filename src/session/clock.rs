use std::time::Duration;

use crate::config::Pacing;
use crate::foundation::core::{Fps, FrameIndex, frame_to_sample};

/// Sample-accurate session clock.
///
/// Audio position is the authority. A video frame becomes due once the audio cursor reaches the
/// frame's first sample, so the frame count never drifts from the audio by more than one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaClock {
    fps: Fps,
    sample_rate: u32,
    next_frame: u64,
    cursor: u64,
}

impl MediaClock {
    /// Clock at time zero.
    pub fn new(fps: Fps, sample_rate: u32) -> Self {
        Self {
            fps,
            sample_rate,
            next_frame: 0,
            cursor: 0,
        }
    }

    /// First audio sample covered by `frame`.
    pub fn frame_start(&self, frame: u64) -> u64 {
        frame_to_sample(frame, self.fps, self.sample_rate)
    }

    /// Audio samples emitted so far.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Video frames emitted so far.
    pub fn frames(&self) -> u64 {
        self.next_frame
    }

    /// Frame to emit before pulling more audio, if one is due.
    pub fn due_frame(&self) -> Option<FrameIndex> {
        (self.cursor >= self.frame_start(self.next_frame)).then_some(FrameIndex(self.next_frame))
    }

    /// Mark the due frame as emitted.
    pub fn advance_frame(&mut self) {
        self.next_frame += 1;
    }

    /// Audio span to pull next: up to the next frame boundary, never past `limit`.
    pub fn pull_span(&self, limit: u64) -> (u64, u64) {
        let end = self.frame_start(self.next_frame).min(limit);
        (self.cursor, end.max(self.cursor))
    }

    /// Move the audio cursor forward to `sample`.
    pub fn advance_to(&mut self, sample: u64) {
        self.cursor = self.cursor.max(sample);
    }
}

/// Spaces media-clock ticks in wall-clock time.
pub(crate) enum Pacer {
    Realtime {
        period: Duration,
        interval: Option<tokio::time::Interval>,
    },
    Offline,
}

impl Pacer {
    pub(crate) fn new(pacing: Pacing, fps: Fps) -> Self {
        match pacing {
            Pacing::Realtime => Self::Realtime {
                period: fps.frame_interval(),
                interval: None,
            },
            Pacing::Offline => Self::Offline,
        }
    }

    pub(crate) async fn tick(&mut self) {
        match self {
            Self::Realtime { period, interval } => {
                // Created on first use so the pacer can be built outside a runtime.
                let iv = interval.get_or_insert_with(|| {
                    let mut iv = tokio::time::interval(*period);
                    iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    iv
                });
                iv.tick().await;
            }
            Self::Offline => tokio::task::yield_now().await,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/clock.rs"]
mod tests;
