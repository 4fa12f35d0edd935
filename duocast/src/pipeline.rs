//! End-to-end podcast creation.
//!
//! [`Pipeline`] wires the configured providers to the individual stages:
//! summaries on disk, core topics, an emotion-tagged transcript, and
//! optionally the rendered audio.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::assembler::{AssemblyReport, AudioAssembler, VoiceCasting};
use crate::audio::SharedSpeechProvider;
use crate::chat::SharedChatProvider;
use crate::config::{ConfigError, DuocastConfig};
use crate::corpus::read_text_dir;
use crate::error::{Error, Result};
use crate::llms::{ElevenLabs, ElevenLabsConfig, OpenAI, OpenAIConfig};
use crate::prompts::HostProfiles;
use crate::summary::Summarizer;
use crate::topics::{SavedTopics, extract_core_topics, generate_core_topics, save_topics};
use crate::transcript::TranscriptParser;
use crate::writer::ScriptWriter;

/// File name of the saved core topics.
pub const TOPICS_FILE: &str = "core_topics.json";
/// File name of the saved transcript.
pub const TRANSCRIPT_FILE: &str = "transcript.txt";
/// File name of the rendered audio.
pub const AUDIO_FILE: &str = "podcast.wav";

/// What [`Pipeline::create_podcast`] wrote.
#[derive(Debug, Clone)]
pub struct PodcastArtifacts {
    /// Saved core topics, as JSON or raw text.
    pub topics: SavedTopics,
    /// Saved transcript.
    pub transcript: PathBuf,
    /// Number of dialogue segments parsed from the transcript, if audio was
    /// requested.
    pub segments: Option<usize>,
    /// Audio assembly result, if audio was requested.
    pub audio: Option<AssemblyReport>,
}

/// Providers, configuration and hosts for every stage.
#[derive(Clone)]
pub struct Pipeline {
    config: DuocastConfig,
    chat: SharedChatProvider,
    speech: Option<SharedSpeechProvider>,
    hosts: HostProfiles,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("chat", &self.chat.provider_name())
            .field("speech", &self.speech.as_ref().map(|s| s.provider_name()))
            .field("hosts", &self.hosts.speaker_a)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline with the default hosts and no speech provider.
    #[must_use]
    pub fn new(config: DuocastConfig, chat: SharedChatProvider) -> Self {
        Self {
            config,
            chat,
            speech: None,
            hosts: HostProfiles::default(),
        }
    }

    /// Build the OpenAI-compatible and ElevenLabs clients from `config`.
    ///
    /// The speech client is only created when a speech key is configured.
    /// Hosts are loaded from `podcast.hosts_file` when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM key is missing or the hosts file cannot
    /// be loaded.
    pub async fn from_config(config: DuocastConfig) -> Result<Self> {
        let chat: SharedChatProvider = Arc::new(OpenAI::new(OpenAIConfig::from(&config.llm))?);

        let speech: Option<SharedSpeechProvider> = match config.speech.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(ElevenLabs::new(
                ElevenLabsConfig::from(&config.speech),
            )?)),
            _ => None,
        };

        let hosts = HostProfiles::load_or_default(config.podcast.hosts_file.as_deref()).await?;

        Ok(Self {
            config,
            chat,
            speech,
            hosts,
        })
    }

    /// Set the speech provider.
    #[must_use]
    pub fn with_speech(mut self, speech: SharedSpeechProvider) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Set the host profiles.
    #[must_use]
    pub fn with_hosts(mut self, hosts: HostProfiles) -> Self {
        self.hosts = hosts;
        self
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &DuocastConfig {
        &self.config
    }

    /// The host profiles in use.
    #[must_use]
    pub const fn hosts(&self) -> &HostProfiles {
        &self.hosts
    }

    /// The chat provider.
    #[must_use]
    pub fn chat(&self) -> &SharedChatProvider {
        &self.chat
    }

    /// Model used for topic extraction.
    #[must_use]
    pub fn topics_model(&self) -> Option<&str> {
        self.config.llm.topics_model.as_deref()
    }

    /// A summarizer over the configured chat provider.
    #[must_use]
    pub fn summarizer(&self) -> Summarizer {
        Summarizer::new(self.chat.clone(), self.config.summary)
    }

    /// A script writer over the configured chat provider.
    #[must_use]
    pub fn writer(&self) -> ScriptWriter {
        ScriptWriter::new(
            self.chat.clone(),
            self.config.podcast.clone(),
            self.config.emotions.clone(),
        )
    }

    /// A transcript parser that also knows the configured aliases and the
    /// host names.
    ///
    /// # Errors
    ///
    /// Returns an error if the aliases conflict.
    pub fn parser(&self) -> Result<TranscriptParser> {
        build_parser(&self.config, &self.hosts)
    }

    /// An assembler over the speech provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no speech provider or voices are
    /// configured.
    pub fn assembler(&self) -> Result<AudioAssembler> {
        let speech = self
            .speech
            .clone()
            .ok_or_else(|| ConfigError::MissingField("speech.api_key".to_owned()))?;
        build_assembler(&self.config, speech)
    }

    /// Create a podcast from the summaries in `summary_dir`.
    ///
    /// With a `theme`, topics are generated for that theme and `duration`
    /// (falling back to the configured default); without one, the model
    /// extracts the core topics itself. Topics, transcript and optionally
    /// `podcast.wav` are written to `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage's error.
    #[instrument(skip(self), fields(summary_dir = %summary_dir.display()))]
    pub async fn create_podcast(
        &self,
        theme: Option<&str>,
        summary_dir: &Path,
        duration: Option<u32>,
        output_dir: &Path,
        with_audio: bool,
    ) -> Result<PodcastArtifacts> {
        // Fail before any model call if audio cannot be rendered.
        let assembler = if with_audio { Some(self.assembler()?) } else { None };

        let summary = read_text_dir(summary_dir).await?;
        if summary.trim().is_empty() {
            return Err(Error::document(format!(
                "no summary text found in {}",
                summary_dir.display()
            )));
        }
        tokio::fs::create_dir_all(output_dir).await?;

        let raw_topics = match theme {
            Some(theme) => {
                let minutes = duration.unwrap_or(self.config.podcast.default_duration_minutes);
                generate_core_topics(self.chat.as_ref(), self.topics_model(), theme, &summary, minutes)
                    .await?
            }
            None => extract_core_topics(self.chat.as_ref(), self.topics_model(), &summary).await?,
        };
        let topics = save_topics(&raw_topics, &output_dir.join(TOPICS_FILE)).await?;

        let transcript = self
            .writer()
            .write_transcript(&summary, &raw_topics, &self.hosts)
            .await?;
        let transcript_path = output_dir.join(TRANSCRIPT_FILE);
        tokio::fs::write(&transcript_path, &transcript).await?;
        info!(path = %transcript_path.display(), "saved transcript");

        let (segments, audio) = match assembler {
            Some(assembler) => {
                let segments = self.parser()?.parse(&transcript)?;
                let report = assembler
                    .assemble(&segments, &output_dir.join(AUDIO_FILE))
                    .await?;
                (Some(segments.len()), Some(report))
            }
            None => (None, None),
        };

        Ok(PodcastArtifacts {
            topics,
            transcript: transcript_path,
            segments,
            audio,
        })
    }
}

/// Parser for transcripts written for `hosts`, honouring the configured mode
/// and extra aliases.
///
/// # Errors
///
/// Returns an error if an alias is blank or names both speakers.
pub fn build_parser(config: &DuocastConfig, hosts: &HostProfiles) -> Result<TranscriptParser> {
    let (mut a, mut b) = hosts.aliases();
    a.extend(config.transcript.speaker_a_aliases.iter().cloned());
    b.extend(config.transcript.speaker_b_aliases.iter().cloned());
    Ok(TranscriptParser::with_aliases(config.transcript.mode, &a, &b)?)
}

/// Assembler casting the configured voices at the configured sample rate.
///
/// # Errors
///
/// Returns a configuration error if a voice is missing.
pub fn build_assembler(config: &DuocastConfig, speech: SharedSpeechProvider) -> Result<AudioAssembler> {
    let casting = VoiceCasting::from_config(config)?;
    Ok(AudioAssembler::new(speech, casting).with_sample_rate(config.speech.sample_rate))
}
