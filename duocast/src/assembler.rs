//! Rendering a parsed transcript to a single audio file.
//!
//! Segments are synthesized one at a time. Every clip is written to a WAV
//! file inside a [`TempDir`]; once all segments are rendered the clips are
//! read back in order and concatenated into the output. The scratch directory
//! is removed on every exit path, and the output only appears after a
//! complete export.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::audio::{
    DEFAULT_SAMPLE_RATE, SharedSpeechProvider, SpeechRequest, Voice, VoiceSettings, read_wav,
    wav_spec, write_wav,
};
use crate::config::{ConfigError, DuocastConfig, EmotionConfig};
use crate::error::{Error, Result};
use crate::transcript::{DialogueSegment, Speaker};

/// Voices for the two speakers and the emotion-to-settings mapping.
#[derive(Debug, Clone)]
pub struct VoiceCasting {
    voice_a: Voice,
    voice_b: Voice,
    emotions: EmotionConfig,
}

impl VoiceCasting {
    /// Cast two voices with the default emotion profiles.
    #[must_use]
    pub fn new(voice_a: impl Into<Voice>, voice_b: impl Into<Voice>) -> Self {
        Self {
            voice_a: voice_a.into(),
            voice_b: voice_b.into(),
            emotions: EmotionConfig::default(),
        }
    }

    /// Replace the emotion mapping.
    #[must_use]
    pub fn with_emotions(mut self, emotions: EmotionConfig) -> Self {
        self.emotions = emotions;
        self
    }

    /// Build from the speech and emotion sections of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if a voice is not configured.
    pub fn from_config(config: &DuocastConfig) -> Result<Self> {
        let voice = |id: Option<&String>, field: &str| {
            id.filter(|v| !v.trim().is_empty())
                .map(|v| Voice::new(v.trim()))
                .ok_or_else(|| ConfigError::MissingField(field.to_owned()))
        };
        Ok(Self {
            voice_a: voice(config.speech.voice_a.as_ref(), "speech.voice_a")?,
            voice_b: voice(config.speech.voice_b.as_ref(), "speech.voice_b")?,
            emotions: config.emotions.clone(),
        })
    }

    /// Voice for a speaker.
    #[must_use]
    pub const fn voice_for(&self, speaker: Speaker) -> &Voice {
        match speaker {
            Speaker::A => &self.voice_a,
            Speaker::B => &self.voice_b,
        }
    }

    /// Settings for an emotion: the expressive or steady profile on an exact
    /// case-insensitive keyword match, else the default profile.
    #[must_use]
    pub fn settings_for(&self, emotion: Option<&str>) -> VoiceSettings {
        let Some(emotion) = emotion.map(str::trim).filter(|e| !e.is_empty()) else {
            return self.emotions.default_profile;
        };
        let emotion = emotion.to_lowercase();
        let matches = |list: &[String]| list.iter().any(|k| k.trim().to_lowercase() == emotion);

        if matches(&self.emotions.expressive) {
            self.emotions.expressive_profile
        } else if matches(&self.emotions.steady) {
            self.emotions.steady_profile
        } else {
            self.emotions.default_profile
        }
    }
}

/// Summary of a finished assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    /// Where the audio was written.
    pub output: PathBuf,
    /// Number of segments rendered.
    pub segments: usize,
    /// Total sample frames written.
    pub frames: usize,
    /// Sample rate of the output.
    pub sample_rate: u32,
    /// Channel count of the output.
    pub channels: u16,
}

impl AssemblyReport {
    /// Playback duration in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / f64::from(self.sample_rate)
    }
}

/// Renders dialogue segments to one WAV file.
#[derive(Clone)]
pub struct AudioAssembler {
    tts: SharedSpeechProvider,
    casting: VoiceCasting,
    sample_rate: u32,
    scratch_root: Option<PathBuf>,
}

impl std::fmt::Debug for AudioAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAssembler")
            .field("tts", &self.tts.provider_name())
            .field("casting", &self.casting)
            .field("sample_rate", &self.sample_rate)
            .field("scratch_root", &self.scratch_root)
            .finish()
    }
}

impl AudioAssembler {
    /// Create an assembler requesting clips at [`DEFAULT_SAMPLE_RATE`].
    #[must_use]
    pub fn new(tts: SharedSpeechProvider, casting: VoiceCasting) -> Self {
        Self {
            tts,
            casting,
            sample_rate: DEFAULT_SAMPLE_RATE,
            scratch_root: None,
        }
    }

    /// Set the requested sample rate.
    #[must_use]
    pub const fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Create scratch directories under `root` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// The voice casting in use.
    #[must_use]
    pub const fn casting(&self) -> &VoiceCasting {
        &self.casting
    }

    /// Synthesize every segment in order and write the concatenation to
    /// `output`.
    ///
    /// Any failure aborts the run and leaves no partial output behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTranscript`] for an empty slice, a provider
    /// error if synthesis fails, [`Error::Audio`] if clips disagree on
    /// sample rate or channel count, or an I/O / WAV error.
    pub async fn assemble(&self, segments: &[DialogueSegment], output: &Path) -> Result<AssemblyReport> {
        if segments.is_empty() {
            return Err(Error::EmptyTranscript);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("duocast-");
        let scratch: TempDir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let mut clip_paths = Vec::with_capacity(segments.len());

        for (index, segment) in segments.iter().enumerate() {
            let settings = self.casting.settings_for(segment.emotion());
            let request = SpeechRequest::new(segment.text(), self.casting.voice_for(segment.speaker()).clone())
                .settings(settings)
                .sample_rate(self.sample_rate);

            debug!(
                index,
                speaker = %segment.speaker(),
                emotion = segment.emotion().unwrap_or("-"),
                stability = settings.stability,
                "synthesizing segment"
            );
            let clip = self.tts.speech(&request).await?;

            let path = scratch.path().join(format!("segment_{index:05}.wav"));
            let target = path.clone();
            blocking(move || write_wav(&target, &clip)).await?;
            clip_paths.push(path);
        }

        let staged = scratch.path().join("output.wav");
        let target = staged.clone();
        let (frames, sample_rate, channels) =
            blocking(move || concatenate(&clip_paths, &target)).await?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        move_into_place(&staged, output).await?;

        let report = AssemblyReport {
            output: output.to_path_buf(),
            segments: segments.len(),
            frames,
            sample_rate,
            channels,
        };
        info!(
            path = %output.display(),
            segments = report.segments,
            duration_secs = report.duration_secs(),
            "podcast audio written"
        );
        Ok(report)
    }
}

/// Append every clip to one WAV writer. Returns frames, rate and channels.
fn concatenate(clips: &[PathBuf], output: &Path) -> Result<(usize, u32, u16)> {
    let mut writer: Option<hound::WavWriter<_>> = None;
    let mut format: Option<(u32, u16)> = None;
    let mut samples = 0usize;

    for path in clips {
        let clip = read_wav(path)?;
        match format {
            None => {
                format = Some((clip.sample_rate, clip.channels));
                writer = Some(hound::WavWriter::create(
                    output,
                    wav_spec(clip.sample_rate, clip.channels),
                )?);
            }
            Some((rate, channels)) if rate != clip.sample_rate || channels != clip.channels => {
                return Err(Error::audio(format!(
                    "clip {} is {} Hz / {} ch, expected {rate} Hz / {channels} ch",
                    path.display(),
                    clip.sample_rate,
                    clip.channels
                )));
            }
            Some(_) => {}
        }

        if let Some(writer) = writer.as_mut() {
            for &sample in &clip.samples {
                writer.write_sample(sample)?;
            }
        }
        samples += clip.samples.len();
    }

    let (Some(writer), Some((rate, channels))) = (writer, format) else {
        return Err(Error::EmptyTranscript);
    };
    writer.finalize()?;

    Ok((samples / usize::from(channels.max(1)), rate, channels))
}

/// Run blocking WAV I/O off the async runtime.
async fn blocking<T, F>(op: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| Error::audio(format!("audio task failed: {e}")))?
}

/// Rename, falling back to copy when the target is on another filesystem.
async fn move_into_place(from: &Path, to: &Path) -> Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    copy_into_place(from, to).await
}

/// Copy to a `.part` sibling of `to`, then rename it over `to`.
///
/// `to` is never observed half-written; the `.part` file is removed on
/// failure.
async fn copy_into_place(from: &Path, to: &Path) -> Result<()> {
    let mut part_name = to.file_name().unwrap_or_default().to_os_string();
    part_name.push(".part");
    let part = to.with_file_name(part_name);

    let copied = match tokio::fs::copy(from, &part).await {
        Ok(_) => tokio::fs::rename(&part, to).await,
        Err(e) => Err(e),
    };
    if let Err(e) = copied {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    mod casting {
        use super::*;

        fn casting() -> VoiceCasting {
            VoiceCasting::new("voice-a", "voice-b")
        }

        #[test]
        fn voice_by_speaker() {
            let c = casting();
            assert_eq!(c.voice_for(Speaker::A).id, "voice-a");
            assert_eq!(c.voice_for(Speaker::B).id, "voice-b");
        }

        #[test]
        fn expressive_and_steady_profiles() {
            let c = casting();
            assert_eq!(c.settings_for(Some("excited")).stability, 0.3);
            assert_eq!(c.settings_for(Some(" Excited ")).stability, 0.3);
            assert_eq!(c.settings_for(Some("兴奋")).stability, 0.3);
            assert_eq!(c.settings_for(Some("thoughtful")).stability, 0.7);
            assert_eq!(c.settings_for(Some("严肃")).stability, 0.7);
        }

        #[test]
        fn unknown_or_missing_is_default() {
            let c = casting();
            assert_eq!(c.settings_for(Some("happy")), VoiceSettings::new(0.5, 0.5));
            assert_eq!(c.settings_for(Some("very excited")).stability, 0.5);
            assert_eq!(c.settings_for(None), VoiceSettings::new(0.5, 0.5));
            assert_eq!(c.settings_for(Some("  ")), VoiceSettings::new(0.5, 0.5));
        }

        #[test]
        fn from_config_requires_voices() {
            let mut config = DuocastConfig::default();
            assert!(matches!(
                VoiceCasting::from_config(&config),
                Err(Error::Config(ConfigError::MissingField(_)))
            ));

            config.speech.voice_a = Some("va".into());
            config.speech.voice_b = Some("vb".into());
            let c = VoiceCasting::from_config(&config).unwrap();
            assert_eq!(c.voice_for(Speaker::B).id, "vb");
        }
    }

    mod placement {
        use super::*;

        #[tokio::test]
        async fn copy_fallback_leaves_no_part_file() {
            let dir = tempfile::tempdir().unwrap();
            let staged = dir.path().join("staged.wav");
            let output = dir.path().join("podcast.wav");
            tokio::fs::write(&staged, b"RIFF").await.unwrap();

            copy_into_place(&staged, &output).await.unwrap();

            assert_eq!(tokio::fs::read(&output).await.unwrap(), b"RIFF");
            assert!(!dir.path().join("podcast.wav.part").exists());
        }

        #[tokio::test]
        async fn failed_copy_leaves_nothing_at_output() {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("podcast.wav");

            let result = copy_into_place(&dir.path().join("missing.wav"), &output).await;

            assert!(matches!(result, Err(Error::Io(_))));
            assert!(!output.exists());
            assert!(!dir.path().join("podcast.wav.part").exists());
        }

        #[tokio::test]
        async fn wav_io_runs_off_the_runtime() {
            use crate::audio::SpeechClip;

            let dir = tempfile::tempdir().unwrap();
            let first = dir.path().join("a.wav");
            let out = dir.path().join("out.wav");
            write_wav(&first, &SpeechClip::new(vec![3; 8], 8_000, 1)).unwrap();

            let target = out.clone();
            let (frames, rate, channels) =
                blocking(move || concatenate(&[first], &target)).await.unwrap();

            assert_eq!((frames, rate, channels), (8, 8_000, 1));
            assert_eq!(read_wav(&out).unwrap().samples, vec![3; 8]);
        }
    }

    #[test]
    fn concatenate_rejects_mixed_rates() {
        use crate::audio::SpeechClip;

        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.wav");
        let second = dir.path().join("b.wav");
        write_wav(&first, &SpeechClip::new(vec![1; 10], 16_000, 1)).unwrap();
        write_wav(&second, &SpeechClip::new(vec![1; 10], 22_050, 1)).unwrap();

        let err = concatenate(&[first, second], &dir.path().join("out.wav")).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));
    }
}
