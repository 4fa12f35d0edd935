//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::audio::{DEFAULT_SAMPLE_RATE, VoiceSettings};
use crate::transcript::ParseMode;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DuocastConfig {
    /// Chat model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Speech synthesis settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Emotion keyword to voice settings mapping.
    #[serde(default)]
    pub emotions: EmotionConfig,

    /// Transcript parsing settings.
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Book summarization settings.
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Script length and host settings.
    #[serde(default)]
    pub podcast: PodcastConfig,
}

/// Chat model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key.
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL.
    pub base_url: String,
    /// Model for summaries and scripts.
    pub model: String,
    /// Model override for topic extraction.
    pub topics_model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_owned(),
            model: "google/gemini-2.0-flash-001".to_owned(),
            topics_model: None,
            timeout_secs: 300,
            temperature: None,
        }
    }
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// API key.
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Synthesis model.
    pub model_id: String,
    /// Voice id for speaker A.
    pub voice_a: Option<String>,
    /// Voice id for speaker B.
    pub voice_b: Option<String>,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.elevenlabs.io/v1".to_owned(),
            model_id: "eleven_multilingual_v2".to_owned(),
            voice_a: None,
            voice_b: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            timeout_secs: 120,
        }
    }
}

/// Emotion keywords and the voice settings they select.
///
/// Matching is exact and case-insensitive against the trimmed emotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// Keywords that select the expressive profile.
    pub expressive: Vec<String>,
    /// Keywords that select the steady profile.
    pub steady: Vec<String>,
    /// Settings for expressive emotions.
    pub expressive_profile: VoiceSettings,
    /// Settings for steady emotions.
    pub steady_profile: VoiceSettings,
    /// Settings for anything else, including no emotion.
    pub default_profile: VoiceSettings,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| (*w).to_owned()).collect();
        Self {
            expressive: words(&["excited", "enthusiastic", "passionate", "兴奋", "激动", "热情"]),
            steady: words(&["calm", "thoughtful", "serious", "平静", "思考", "严肃"]),
            expressive_profile: VoiceSettings::new(0.3, 0.5),
            steady_profile: VoiceSettings::new(0.7, 0.5),
            default_profile: VoiceSettings::new(0.5, 0.5),
        }
    }
}

/// Transcript parsing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Policy for unattributable lines.
    pub mode: ParseMode,
    /// Extra names recognised as speaker A.
    pub speaker_a_aliases: Vec<String>,
    /// Extra names recognised as speaker B.
    pub speaker_b_aliases: Vec<String>,
}

/// Book summarization configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Target length of each chunk summary.
    pub chunk_target_length: usize,
    /// Target length of the combined summary.
    pub combined_target_length: usize,
    /// Attempts per model call.
    pub max_attempts: u32,
    /// Delay between chunk summary attempts.
    pub chunk_retry_delay_secs: u64,
    /// Delay between combine attempts.
    pub combine_retry_delay_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 15_000,
            chunk_target_length: 5_000,
            combined_target_length: 30_000,
            max_attempts: 3,
            chunk_retry_delay_secs: 5,
            combine_retry_delay_secs: 10,
        }
    }
}

/// Script length and host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PodcastConfig {
    /// Speaking rate used to size scripts.
    pub words_per_minute: u32,
    /// Duration used when topics carry none.
    pub default_duration_minutes: u32,
    /// File with host and character profiles.
    pub hosts_file: Option<PathBuf>,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 150,
            default_duration_minutes: 20,
            hosts_file: None,
        }
    }
}

impl DuocastConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.llm.api_key.as_deref().is_none_or(str::is_empty) {
            issues.push(ConfigIssue::error(
                "llm.api_key",
                "No LLM API key. Set OPENROUTER_API_KEY env var.",
            ));
        }

        if self.speech.api_key.as_deref().is_none_or(str::is_empty) {
            issues.push(ConfigIssue::warning(
                "speech.api_key",
                "No speech API key; audio synthesis is unavailable. Set ELEVENLABS_API_KEY.",
            ));
        }
        for (path, voice) in [
            ("speech.voice_a", &self.speech.voice_a),
            ("speech.voice_b", &self.speech.voice_b),
        ] {
            if voice.as_deref().is_none_or(str::is_empty) {
                issues.push(ConfigIssue::warning(path, "Voice id is not set"));
            }
        }

        if self.speech.sample_rate == 0 {
            issues.push(ConfigIssue::error(
                "speech.sample_rate",
                "Sample rate must be positive",
            ));
        }
        if self.summary.chunk_size == 0 {
            issues.push(ConfigIssue::error(
                "summary.chunk_size",
                "Chunk size must be at least 1",
            ));
        }
        if self.summary.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                "summary.max_attempts",
                "Max attempts must be at least 1",
            ));
        }
        if self.podcast.words_per_minute == 0 {
            issues.push(ConfigIssue::error(
                "podcast.words_per_minute",
                "Words per minute must be at least 1",
            ));
        }

        for (path, profile) in [
            ("emotions.expressive_profile", self.emotions.expressive_profile),
            ("emotions.steady_profile", self.emotions.steady_profile),
            ("emotions.default_profile", self.emotions.default_profile),
        ] {
            if !profile.is_valid() {
                issues.push(ConfigIssue::error(
                    path,
                    "stability and similarity_boost must lie in [0, 1]",
                ));
            }
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge process environment variables into the configuration.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup` into the configuration.
    ///
    /// Keys are only filled where the file left them unset, except the
    /// `DUOCAST_*` overrides which always win.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("OPENROUTER_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(url) = lookup("DUOCAST_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("DUOCAST_LLM_MODEL") {
            self.llm.model = model;
        }

        if self.speech.api_key.is_none() {
            self.speech.api_key = lookup("ELEVENLABS_API_KEY");
        }
        if let Some(voice) = lookup("DUOCAST_VOICE_A") {
            self.speech.voice_a = Some(voice);
        }
        if let Some(voice) = lookup("DUOCAST_VOICE_B") {
            self.speech.voice_b = Some(voice);
        }

        self
    }
}

/// Configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "speech.voice_a").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Error that prevents the pipeline from running.
    Error,
    /// Warning about a feature that will be unavailable.
    Warning,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn ready() -> DuocastConfig {
        let mut config = DuocastConfig::default();
        config.llm.api_key = Some("sk-or".into());
        config.speech.api_key = Some("xi".into());
        config.speech.voice_a = Some("va".into());
        config.speech.voice_b = Some("vb".into());
        config
    }

    #[test]
    fn default_config() {
        let config = DuocastConfig::default();
        assert_eq!(config.llm.model, "google/gemini-2.0-flash-001");
        assert_eq!(config.speech.model_id, "eleven_multilingual_v2");
        assert_eq!(config.summary.max_attempts, 3);
        assert_eq!(config.podcast.default_duration_minutes, 20);
        assert_eq!(config.transcript.mode, ParseMode::Lenient);
    }

    #[test]
    fn config_serialization() {
        let config = ready();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: DuocastConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.speech.voice_a, config.speech.voice_a);
        assert_eq!(parsed.emotions.expressive, config.emotions.expressive);
    }

    #[test]
    fn parse_sample_config() {
        let toml_str = r#"
[llm]
model = "qwen/qwq-32b:free"

[speech]
voice_a = "pNInz6obpgDQGcFmaJgB"
sample_rate = 22050

[transcript]
mode = "strict"
speaker_a_aliases = ["Samuel"]

[emotions]
expressive = ["thrilled"]
"#;

        let config: DuocastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.model, "qwen/qwq-32b:free");
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.speech.sample_rate, 22_050);
        assert_eq!(config.transcript.mode, ParseMode::Strict);
        assert_eq!(config.emotions.expressive, vec!["thrilled".to_owned()]);
        assert_eq!(config.emotions.steady.len(), 6);
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(toml::from_str::<DuocastConfig>("[agents]\nx = 1").is_err());
    }

    mod validation {
        use super::*;

        #[test]
        fn complete_config_is_clean() {
            assert!(ready().validate().is_empty());
        }

        #[test]
        fn missing_llm_key_is_error() {
            let mut config = ready();
            config.llm.api_key = None;
            assert!(!config.is_valid());
        }

        #[test]
        fn missing_speech_parts_are_warnings() {
            let mut config = ready();
            config.speech.api_key = None;
            config.speech.voice_b = None;
            let issues = config.validate();
            assert_eq!(issues.len(), 2);
            assert!(issues.iter().all(|i| i.level == IssueLevel::Warning));
            assert!(config.is_valid());
        }

        #[test]
        fn zero_values_are_errors() {
            let mut config = ready();
            config.summary.chunk_size = 0;
            config.summary.max_attempts = 0;
            config.speech.sample_rate = 0;
            let errors = config
                .validate()
                .into_iter()
                .filter(|i| i.level == IssueLevel::Error)
                .count();
            assert_eq!(errors, 3);
        }

        #[test]
        fn out_of_range_profile_is_error() {
            let mut config = ready();
            config.emotions.steady_profile = VoiceSettings::new(1.5, 0.5);
            let issues = config.validate();
            assert_eq!(issues[0].path, "emotions.steady_profile");
        }

        #[test]
        fn issue_display() {
            let issue = ConfigIssue::warning("speech.voice_a", "Voice id is not set");
            assert_eq!(issue.to_string(), "[WARN] speech.voice_a: Voice id is not set");
        }
    }

    mod env_overlay {
        use super::*;

        fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect()
        }

        #[test]
        fn fills_missing_keys() {
            let vars = env(&[
                ("OPENAI_API_KEY", "sk-openai"),
                ("ELEVENLABS_API_KEY", "xi"),
                ("DUOCAST_VOICE_A", "va"),
            ]);
            let config = DuocastConfig::default().with_env_from(|k| vars.get(k).cloned());
            assert_eq!(config.llm.api_key.as_deref(), Some("sk-openai"));
            assert_eq!(config.speech.api_key.as_deref(), Some("xi"));
            assert_eq!(config.speech.voice_a.as_deref(), Some("va"));
            assert_eq!(config.speech.voice_b, None);
        }

        #[test]
        fn openrouter_key_preferred() {
            let vars = env(&[("OPENAI_API_KEY", "a"), ("OPENROUTER_API_KEY", "b")]);
            let config = DuocastConfig::default().with_env_from(|k| vars.get(k).cloned());
            assert_eq!(config.llm.api_key.as_deref(), Some("b"));
        }

        #[test]
        fn file_key_kept_but_overrides_apply() {
            let vars = env(&[
                ("OPENROUTER_API_KEY", "from-env"),
                ("DUOCAST_LLM_MODEL", "qwen/qwq-32b:free"),
            ]);
            let mut config = DuocastConfig::default();
            config.llm.api_key = Some("from-file".into());
            let config = config.with_env_from(|k| vars.get(k).cloned());
            assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
            assert_eq!(config.llm.model, "qwen/qwq-32b:free");
        }

        #[test]
        fn blank_values_ignored() {
            let vars = env(&[("OPENROUTER_API_KEY", "  ")]);
            let config = DuocastConfig::default().with_env_from(|k| vars.get(k).cloned());
            assert!(config.llm.api_key.is_none());
        }
    }
}
