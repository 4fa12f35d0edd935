//! ElevenLabs API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::llms::LlmError;

use super::config::ElevenLabsConfig;

/// Error envelope. `detail` is either a string or an object.
#[derive(Debug, Deserialize)]
struct ElevenLabsErrorResponse {
    detail: ElevenLabsErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ElevenLabsErrorDetail {
    Structured {
        #[serde(default)]
        status: Option<String>,
        message: String,
    },
    Text(String),
}

/// ElevenLabs API client.
#[derive(Debug, Clone)]
pub struct ElevenLabs {
    pub(crate) config: Arc<ElevenLabsConfig>,
    pub(crate) client: Client,
}

impl ElevenLabs {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the API key is empty, or an internal error
    /// if the HTTP client cannot be built.
    pub fn new(config: ElevenLabsConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("elevenlabs", "API key is required").into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Get the synthesis model.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    /// Build the synthesis URL for a voice and PCM sample rate.
    pub(crate) fn speech_url(&self, voice_id: &str, sample_rate: u32) -> String {
        format!(
            "{}/text-to-speech/{voice_id}?output_format=pcm_{sample_rate}",
            self.config.base_url
        )
    }

    /// Build an authenticated JSON request.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("xi-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
    }

    /// Parse an error response body.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<ElevenLabsErrorResponse>(body) {
            let (code, message) = match error_response.detail {
                ElevenLabsErrorDetail::Structured { status, message } => (status, message),
                ElevenLabsErrorDetail::Text(message) => (None, message),
            };

            return match status {
                401 | 403 => LlmError::auth("elevenlabs", message),
                429 => LlmError::rate_limited("elevenlabs"),
                _ => match code {
                    Some(code) => LlmError::provider_code("elevenlabs", code, message),
                    None => LlmError::provider("elevenlabs", message),
                },
            };
        }

        LlmError::http_status(status, body.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn speech_url_requests_pcm() {
        let client = ElevenLabs::new(ElevenLabsConfig::new("xi")).unwrap();
        assert_eq!(
            client.speech_url("voice123", 44_100),
            "https://api.elevenlabs.io/v1/text-to-speech/voice123?output_format=pcm_44100"
        );
    }

    #[test]
    fn rejects_empty_key() {
        assert!(ElevenLabs::new(ElevenLabsConfig::default()).is_err());
    }

    #[test]
    fn structured_detail() {
        let body = r#"{"detail":{"status":"voice_not_found","message":"A voice with that id was not found"}}"#;
        match ElevenLabs::parse_error(400, body) {
            LlmError::Provider { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("voice_not_found"));
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_text_detail() {
        let body = r#"{"detail":"Invalid API key"}"#;
        assert!(matches!(
            ElevenLabs::parse_error(401, body),
            LlmError::Auth { .. }
        ));
    }

    #[test]
    fn quota_is_rate_limited() {
        let body = r#"{"detail":{"status":"too_many_concurrent_requests","message":"busy"}}"#;
        assert!(ElevenLabs::parse_error(429, body).is_retryable());
    }
}
