//! Speech synthesis types, the provider trait, and WAV helpers.
//!
//! Providers return raw 16-bit PCM as a [`SpeechClip`]. Clips are persisted
//! as WAV files with [`write_wav`] and read back with [`read_wav`] so the
//! assembler can concatenate them sample for sample.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// A synthesis voice, identified by the provider's voice id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    /// Provider voice identifier.
    pub id: String,
}

impl Voice {
    /// Create a new voice with the given ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl<S: Into<String>> From<S> for Voice {
    fn from(s: S) -> Self {
        Self::new(s)
    }
}

/// Expressiveness parameters sent with every synthesis request.
///
/// Lower `stability` gives a livelier, more variable delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Delivery stability in `[0, 1]`.
    pub stability: f32,
    /// Adherence to the reference voice in `[0, 1]`.
    pub similarity_boost: f32,
}

impl VoiceSettings {
    /// Create voice settings.
    #[must_use]
    pub const fn new(stability: f32, similarity_boost: f32) -> Self {
        Self {
            stability,
            similarity_boost,
        }
    }

    /// Whether both values lie in `[0, 1]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.stability) && (0.0..=1.0).contains(&self.similarity_boost)
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// Request for synthesizing one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak.
    pub input: String,
    /// Voice to speak with.
    pub voice: Voice,
    /// Expressiveness settings.
    pub settings: VoiceSettings,
    /// Requested PCM sample rate in Hz.
    pub sample_rate: u32,
}

impl SpeechRequest {
    /// Create a request with default settings at [`DEFAULT_SAMPLE_RATE`].
    #[must_use]
    pub fn new(input: impl Into<String>, voice: impl Into<Voice>) -> Self {
        Self {
            input: input.into(),
            voice: voice.into(),
            settings: VoiceSettings::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Set the voice settings.
    #[must_use]
    pub const fn settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the sample rate.
    #[must_use]
    pub const fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// Decoded 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    /// Interleaved samples.
    pub samples: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

impl SpeechClip {
    /// Create a clip from samples.
    #[must_use]
    pub const fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Decode little-endian signed 16-bit PCM bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if the byte count is odd.
    pub fn from_pcm_le(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(Error::audio(format!(
                "PCM payload has odd length {}",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self::new(samples, sample_rate, channels))
    }

    /// Number of sample frames.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback duration in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// WAV header spec for this clip.
    #[must_use]
    pub const fn wav_spec(&self) -> hound::WavSpec {
        wav_spec(self.sample_rate, self.channels)
    }
}

/// A backend able to turn text into speech.
#[async_trait]
pub trait TextToSpeechProvider: Send + Sync {
    /// Synthesize one utterance.
    async fn speech(&self, request: &SpeechRequest) -> Result<SpeechClip>;

    /// Get the name of this provider.
    fn provider_name(&self) -> &'static str;
}

/// Type alias for an Arc-wrapped TextToSpeechProvider.
pub type SharedSpeechProvider = Arc<dyn TextToSpeechProvider>;

/// 16-bit integer PCM spec.
#[must_use]
pub const fn wav_spec(sample_rate: u32, channels: u16) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write a clip as a 16-bit WAV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_wav(path: impl AsRef<Path>, clip: &SpeechClip) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, clip.wav_spec())?;
    for &sample in &clip.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a 16-bit integer WAV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not 16-bit integer PCM.
pub fn read_wav(path: impl AsRef<Path>) -> Result<SpeechClip> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::audio(format!(
            "expected 16-bit integer PCM, got {} bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(SpeechClip::new(samples, spec.sample_rate, spec.channels))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    mod speech_clip {
        use super::*;

        #[test]
        fn decodes_little_endian() {
            let clip = SpeechClip::from_pcm_le(&[0x01, 0x00, 0xff, 0xff], 8_000, 1).unwrap();
            assert_eq!(clip.samples, vec![1, -1]);
        }

        #[test]
        fn rejects_odd_length() {
            let err = SpeechClip::from_pcm_le(&[0x01, 0x00, 0x02], 8_000, 1).unwrap_err();
            assert!(matches!(err, Error::Audio(_)));
        }

        #[test]
        fn duration_counts_frames() {
            let clip = SpeechClip::new(vec![0; 44_100], 44_100, 1);
            assert_eq!(clip.duration_secs(), 1.0);
            let stereo = SpeechClip::new(vec![0; 44_100], 44_100, 2);
            assert_eq!(stereo.duration_secs(), 0.5);
        }
    }

    mod wav_files {
        use super::*;

        #[test]
        fn write_then_read_keeps_samples() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("clip.wav");
            let clip = SpeechClip::new(vec![0, 100, -100, i16::MAX, i16::MIN], 22_050, 1);

            write_wav(&path, &clip).unwrap();
            assert_eq!(read_wav(&path).unwrap(), clip);
        }

        #[test]
        fn rejects_float_wav() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("float.wav");
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 8_000,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            };
            let mut writer = hound::WavWriter::create(&path, spec).unwrap();
            writer.write_sample(0.5_f32).unwrap();
            writer.finalize().unwrap();

            assert!(matches!(read_wav(&path), Err(Error::Audio(_))));
        }
    }

    #[test]
    fn voice_settings_range() {
        assert!(VoiceSettings::default().is_valid());
        assert!(!VoiceSettings::new(1.2, 0.5).is_valid());
        assert!(!VoiceSettings::new(0.5, -0.1).is_valid());
    }
}
