use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::assets::fetch::AssetFetcher;
use crate::assets::media;
use crate::audio::mix::{remix, resample_linear};
use crate::foundation::core::samples_to_duration;
use crate::foundation::error::{AssetSlot, SceneError};
use crate::scene::model::AssetRef;

/// Target PCM layout for decoded audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Decoded interleaved floating-point PCM.
///
/// The sample data is shared so the audio graph can hold it without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub samples: Arc<Vec<f32>>,
}

impl DecodedAudio {
    /// Wrap interleaved samples.
    pub fn new(format: AudioFormat, samples: Vec<f32>) -> Self {
        Self {
            sample_rate: format.sample_rate,
            channels: format.channels,
            samples: Arc::new(samples),
        }
    }

    /// Layout of this buffer.
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> u64 {
        (self.samples.len() / usize::from(self.channels.max(1))) as u64
    }

    /// Exact playable duration.
    pub fn duration(&self) -> Duration {
        samples_to_duration(self.frames(), self.sample_rate)
    }
}

/// Encoded bytes to PCM.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Decode `bytes` into `format`.
    async fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<DecodedAudio, SceneError>;
}

/// Default decoder: WAV in-process via `hound`, anything else through `ffmpeg`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcmDecoder;

fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Decode a RIFF/WAVE payload to interleaved `f32` at its native rate and layout.
pub(crate) fn decode_wav(bytes: &[u8]) -> Result<(AudioFormat, Vec<f32>), SceneError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| SceneError::decode(format!("invalid WAV: {e}")))?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| SceneError::decode(format!("WAV samples: {e}")))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| SceneError::decode(format!("WAV samples: {e}")))?
        }
    };
    Ok((
        AudioFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        },
        samples,
    ))
}

#[async_trait]
impl AudioDecoder for PcmDecoder {
    async fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<DecodedAudio, SceneError> {
        if bytes.is_empty() {
            return Err(SceneError::decode("audio payload is empty"));
        }

        let samples = if is_wav(bytes) {
            let (src, pcm) = decode_wav(bytes)?;
            let pcm = remix(&pcm, src.channels, format.channels);
            resample_linear(&pcm, format.channels, src.sample_rate, format.sample_rate)
        } else {
            media::decode_audio_f32(bytes, format.sample_rate, format.channels)
                .await
                .map_err(|e| SceneError::decode(e.to_string()))?
        };

        let decoded = DecodedAudio::new(format, samples);
        if decoded.frames() == 0 {
            return Err(SceneError::decode("audio decoded to zero frames"));
        }
        Ok(decoded)
    }
}

/// Fetch and decode one scene's narration.
#[tracing::instrument(skip_all, fields(asset = %asset.display_short()))]
pub async fn decode_scene_audio(
    fetcher: &dyn AssetFetcher,
    decoder: &dyn AudioDecoder,
    asset: &AssetRef,
    format: AudioFormat,
) -> Result<DecodedAudio, SceneError> {
    let bytes = fetcher
        .fetch(asset)
        .await
        .map_err(|e| SceneError::fetch(AssetSlot::Audio, e.to_string()))?;
    let decoded = decoder.decode(&bytes, format).await?;
    tracing::debug!(
        frames = decoded.frames(),
        duration_ms = decoded.duration().as_millis() as u64,
        "audio decoded"
    );
    Ok(decoded)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;
