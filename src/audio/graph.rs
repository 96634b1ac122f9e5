use std::sync::Arc;

use crate::audio::decode::{AudioFormat, DecodedAudio};
use crate::audio::mix::clamp_in_place;
use crate::foundation::error::{ReelError, ReelResult};

/// Handle to a buffer scheduled in an [`AudioGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

#[derive(Debug)]
struct ScheduledSource {
    id: SourceId,
    start: u64,
    frames: u64,
    samples: Arc<Vec<f32>>,
}

impl ScheduledSource {
    fn end(&self) -> u64 {
        self.start + self.frames
    }
}

/// Sample-clocked mixer with a single output.
///
/// Buffers are scheduled at absolute timeline positions and mixed on demand; nothing plays until
/// its start sample is rendered, and nothing past the last scheduled sample is ever produced
/// except silence.
#[derive(Debug)]
pub struct AudioGraph {
    format: AudioFormat,
    sources: Vec<ScheduledSource>,
    next_id: u64,
}

impl AudioGraph {
    /// Create a graph. An unusable format is session-fatal.
    pub fn new(format: AudioFormat) -> ReelResult<Self> {
        if format.sample_rate == 0 {
            return Err(ReelError::session("audio graph sample rate must be > 0"));
        }
        if !(1..=2).contains(&format.channels) {
            return Err(ReelError::session(format!(
                "audio graph supports 1 or 2 channels, got {}",
                format.channels
            )));
        }
        Ok(Self {
            format,
            sources: Vec::new(),
            next_id: 0,
        })
    }

    /// Output layout.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Start `buffer` at timeline sample `at`.
    pub fn schedule(&mut self, buffer: &DecodedAudio, at: u64) -> ReelResult<SourceId> {
        if buffer.format() != self.format {
            return Err(ReelError::session(format!(
                "buffer format {:?} does not match graph format {:?}",
                buffer.format(),
                self.format
            )));
        }
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.sources.push(ScheduledSource {
            id,
            start: at,
            frames: buffer.frames(),
            samples: Arc::clone(&buffer.samples),
        });
        tracing::debug!(source = id.0, at, frames = buffer.frames(), "audio scheduled");
        Ok(id)
    }

    /// Mix `[start, end)` into interleaved output, clamped to `[-1, 1]`.
    pub fn render(&self, start: u64, end: u64) -> Vec<f32> {
        let ch = usize::from(self.format.channels);
        let frames = end.saturating_sub(start) as usize;
        let mut out = vec![0.0f32; frames * ch];
        for src in &self.sources {
            let lo = src.start.max(start);
            let hi = src.end().min(end);
            if lo >= hi {
                continue;
            }
            let src_off = (lo - src.start) as usize * ch;
            let dst_off = (lo - start) as usize * ch;
            let n = (hi - lo) as usize * ch;
            for (d, s) in out[dst_off..dst_off + n]
                .iter_mut()
                .zip(&src.samples[src_off..src_off + n])
            {
                *d += *s;
            }
        }
        clamp_in_place(&mut out);
        out
    }

    /// End of the last scheduled sample, or 0.
    pub fn horizon(&self) -> u64 {
        self.sources.iter().map(ScheduledSource::end).max().unwrap_or(0)
    }

    /// Drop a scheduled source and its buffer.
    pub fn release(&mut self, id: SourceId) {
        self.sources.retain(|s| s.id != id);
    }

    /// Drop every scheduled source.
    pub fn release_all(&mut self) {
        self.sources.clear();
    }

    /// Number of sources still holding buffers.
    pub fn live_sources(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/graph.rs"]
mod tests;
