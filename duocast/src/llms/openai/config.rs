//! OpenAI-compatible client configuration.

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llms::LlmError;

/// Configuration for the OpenAI-compatible client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Default sampling temperature.
    pub temperature: Option<f32>,
}

impl OpenAIConfig {
    /// Default API base URL (OpenRouter).
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai/api/v1";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "google/gemini-2.0-flash-001";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENROUTER_API_KEY` - API key, falling back to `OPENAI_API_KEY`
    /// - `DUOCAST_LLM_BASE_URL` - Optional base URL
    /// - `DUOCAST_LLM_MODEL` - Optional default model
    ///
    /// # Errors
    ///
    /// Returns an auth error if no API key is set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                LlmError::auth("openai", "OPENROUTER_API_KEY environment variable not set")
            })?;

        let base_url = std::env::var("DUOCAST_LLM_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let model =
            std::env::var("DUOCAST_LLM_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned());

        Ok(Self {
            api_key,
            base_url,
            model,
            ..Self::default()
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the default temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(300),
            temperature: None,
        }
    }
}

impl From<&LlmConfig> for OpenAIConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            timeout_secs: Some(config.timeout_secs),
            temperature: config.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new() {
        let config = OpenAIConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, OpenAIConfig::DEFAULT_BASE_URL);
        assert_eq!(config.model, OpenAIConfig::DEFAULT_MODEL);
    }

    #[test]
    fn config_builder() {
        let config = OpenAIConfig::new("key")
            .with_model("qwen/qwq-32b:free")
            .with_timeout(60)
            .with_temperature(0.7);

        assert_eq!(config.model, "qwen/qwq-32b:free");
        assert_eq!(config.timeout_secs, Some(60));
        assert_eq!(config.temperature, Some(0.7));
    }

    #[test]
    fn from_settings_strips_trailing_slash() {
        let settings = LlmConfig {
            api_key: Some("k".into()),
            base_url: "http://localhost:8080/v1/".into(),
            ..LlmConfig::default()
        };
        let config = OpenAIConfig::from(&settings);
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.api_key, "k");
    }
}
