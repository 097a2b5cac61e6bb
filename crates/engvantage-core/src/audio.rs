//! PCM audio decode and the playback seam.
//!
//! The speech boundary returns raw little-endian 16-bit PCM (mono, 24 kHz).
//! Decoding to normalized `f32` samples is pure and tested here; actually
//! producing sound is a runtime capability behind the `SpeechPlayer` trait.

use tracing::debug;

/// Sample rate of synthesized speech payloads.
pub const TTS_SAMPLE_RATE: u32 = 24_000;

/// Channel count of synthesized speech payloads.
pub const TTS_CHANNELS: u16 = 1;

/// Decode little-endian 16-bit PCM bytes into normalized `f32` samples.
///
/// Samples land in `[-1.0, 1.0]`. A trailing odd byte is ignored.
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// A decoded, playable audio clip.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    /// Decode a raw PCM16 speech payload into a clip at the TTS format.
    pub fn from_pcm16(bytes: &[u8]) -> Self {
        Self {
            samples: decode_pcm16(bytes),
            sample_rate: TTS_SAMPLE_RATE,
            channels: TTS_CHANNELS,
        }
    }

    /// Clip duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

/// Playback seam the runtime provides.
///
/// Playback is fire-and-forget: `play` starts the clip and returns;
/// overlapping clips are independent sources with no mixing or queueing.
pub trait SpeechPlayer: Send + Sync {
    fn play(&self, clip: AudioClip);
}

/// Player that logs and drops every clip. Used by tests and headless runs.
pub struct NullPlayer;

impl SpeechPlayer for NullPlayer {
    fn play(&self, clip: AudioClip) {
        debug!(
            samples = clip.samples.len(),
            duration_ms = clip.duration_ms(),
            "discarding audio clip (no output device)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_little_endian() {
        // 0x0100 LE = 256, 0xFF7F LE = 32767
        let samples = decode_pcm16(&[0x00, 0x01, 0xFF, 0x7F]);
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 256.0 / 32768.0).abs() < f32::EPSILON);
        assert!((samples[1] - 32767.0 / 32768.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decode_stays_within_unit_range() {
        let extremes = [0x00u8, 0x80, 0xFF, 0x7F, 0x00, 0x00];
        let samples = decode_pcm16(&extremes);
        assert_eq!(samples, vec![-1.0, 32767.0 / 32768.0, 0.0]);
        for s in samples {
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn decode_ignores_trailing_odd_byte() {
        let samples = decode_pcm16(&[0x00, 0x00, 0x42]);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn empty_payload_decodes_empty() {
        assert!(decode_pcm16(&[]).is_empty());
    }

    #[test]
    fn clip_duration() {
        // One second of mono 24 kHz audio.
        let clip = AudioClip {
            samples: vec![0.0; 24_000],
            sample_rate: TTS_SAMPLE_RATE,
            channels: 1,
        };
        assert_eq!(clip.duration_ms(), 1000);

        let half = AudioClip::from_pcm16(&vec![0u8; 24_000]);
        assert_eq!(half.duration_ms(), 500);
    }
}
