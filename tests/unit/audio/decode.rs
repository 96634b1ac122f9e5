use super::*;
use crate::foundation::error::ReelResult;

fn wav_bytes(rate: u32, channels: u16, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cur = Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut cur, spec).unwrap();
        for _ in 0..frames * usize::from(channels) {
            w.write_sample(i16::MAX / 2).unwrap();
        }
        w.finalize().unwrap();
    }
    cur.into_inner()
}

const STEREO_48K: AudioFormat = AudioFormat {
    sample_rate: 48_000,
    channels: 2,
};

#[tokio::test]
async fn wav_is_converted_to_graph_format() {
    let bytes = wav_bytes(24_000, 1, 24_000);
    let d = PcmDecoder.decode(&bytes, STEREO_48K).await.unwrap();
    assert_eq!(d.format(), STEREO_48K);
    assert_eq!(d.frames(), 48_000);
    assert_eq!(d.duration(), Duration::from_secs(1));
    assert!((d.samples[0] - 0.5).abs() < 1e-3);
}

#[tokio::test]
async fn float_wav_decodes() {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 48_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cur = Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut cur, spec).unwrap();
        for _ in 0..960 {
            w.write_sample(0.25f32).unwrap();
        }
        w.finalize().unwrap();
    }
    let d = PcmDecoder.decode(cur.get_ref(), STEREO_48K).await.unwrap();
    assert_eq!(d.frames(), 480);
    assert_eq!(d.duration(), Duration::from_millis(10));
}

#[tokio::test]
async fn empty_and_zero_frame_audio_fail_decode() {
    let err = PcmDecoder.decode(&[], STEREO_48K).await.unwrap_err();
    assert!(matches!(err, SceneError::Decode(_)));

    let silent = wav_bytes(48_000, 2, 0);
    let err = PcmDecoder.decode(&silent, STEREO_48K).await.unwrap_err();
    assert!(matches!(err, SceneError::Decode(_)));
}

#[tokio::test]
async fn truncated_wav_fails_decode() {
    let mut bytes = wav_bytes(48_000, 2, 100);
    bytes.truncate(20);
    let err = PcmDecoder.decode(&bytes, STEREO_48K).await.unwrap_err();
    assert!(matches!(err, SceneError::Decode(_)));
}

struct FailingFetcher;

#[async_trait]
impl AssetFetcher for FailingFetcher {
    async fn fetch(&self, _asset: &AssetRef) -> ReelResult<Vec<u8>> {
        Err(crate::foundation::error::ReelError::validation("offline"))
    }
}

#[tokio::test]
async fn fetch_failure_is_tagged_with_audio_slot() {
    let err = decode_scene_audio(&FailingFetcher, &PcmDecoder, &AssetRef::new("a.wav"), STEREO_48K)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::Fetch {
            slot: AssetSlot::Audio,
            ..
        }
    ));
}
