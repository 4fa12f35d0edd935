//! ElevenLabs client configuration.

use crate::config::SpeechConfig;

/// Configuration for the ElevenLabs client.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API key, sent as `xi-api-key`.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Synthesis model.
    pub model_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ElevenLabsConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elevenlabs.io/v1";
    /// Default multilingual model.
    pub const DEFAULT_MODEL: &'static str = "eleven_multilingual_v2";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the synthesis model.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model_id: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(120),
        }
    }
}

impl From<&SpeechConfig> for ElevenLabsConfig {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            model_id: config.model_id.clone(),
            timeout_secs: Some(config.timeout_secs),
        }
    }
}
