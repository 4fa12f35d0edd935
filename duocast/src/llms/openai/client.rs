//! OpenAI-compatible API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::{ChatRequest, Message};
use crate::error::Result;
use crate::llms::LlmError;

use super::config::OpenAIConfig;
use super::types::{OpenAIChatRequest, OpenAIErrorResponse, OpenAIMessage};

/// OpenAI-compatible API client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the API key is empty, or an internal error
    /// if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("openai", "API key is required").into());
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

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`OpenAIConfig::from_env`] and [`OpenAI::new`].
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig::from_env()?;
        Self::new(config)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Build request headers for JSON requests.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }

    /// Convert a message to the wire format.
    pub(crate) fn convert_message(msg: &Message) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }

    /// Build the request body.
    pub(crate) fn build_body(&self, request: &ChatRequest) -> OpenAIChatRequest {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        OpenAIChatRequest {
            model,
            messages: request.messages.iter().map(Self::convert_message).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature.or(self.config.temperature),
        }
    }

    /// Parse an error response body.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;
            let code = match error.code {
                Some(serde_json::Value::String(s)) => Some(s),
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                _ => error.error_type,
            };

            return match status {
                401 | 403 => LlmError::auth("openai", error.message),
                429 => LlmError::rate_limited("openai"),
                _ => match code {
                    Some(code) => LlmError::provider_code("openai", code, error.message),
                    None => LlmError::provider("openai", error.message),
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

    fn client() -> OpenAI {
        OpenAI::new(OpenAIConfig::new("sk-test").with_temperature(0.3)).unwrap()
    }

    #[test]
    fn rejects_empty_key() {
        let err = OpenAI::new(OpenAIConfig::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Llm(LlmError::Auth { .. })));
    }

    #[test]
    fn chat_url_appends_path() {
        assert_eq!(
            client().chat_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn body_falls_back_to_defaults() {
        let body = client().build_body(&ChatRequest::default().user("hi"));
        assert_eq!(body.model, OpenAIConfig::DEFAULT_MODEL);
        assert_eq!(body.temperature, Some(0.3));
        assert_eq!(body.messages[0].role, "user");
    }

    #[test]
    fn body_prefers_request_values() {
        let request = ChatRequest::new("qwen/qwq-32b:free")
            .system("sys")
            .temperature(0.9);
        let body = client().build_body(&request);
        assert_eq!(body.model, "qwen/qwq-32b:free");
        assert_eq!(body.temperature, Some(0.9));
        assert_eq!(body.messages[0].role, "system");
    }

    mod parse_error {
        use super::*;

        #[test]
        fn unauthorized() {
            let body = r#"{"error":{"message":"No auth credentials found","code":401}}"#;
            assert!(matches!(
                OpenAI::parse_error(401, body),
                LlmError::Auth { .. }
            ));
        }

        #[test]
        fn rate_limited() {
            let body = r#"{"error":{"message":"slow down","type":"rate_limit"}}"#;
            let err = OpenAI::parse_error(429, body);
            assert!(err.is_retryable());
        }

        #[test]
        fn numeric_code_kept() {
            let body = r#"{"error":{"message":"model not found","code":404}}"#;
            match OpenAI::parse_error(404, body) {
                LlmError::Provider { code, .. } => assert_eq!(code.as_deref(), Some("404")),
                other => panic!("unexpected: {other:?}"),
            }
        }

        #[test]
        fn non_json_body() {
            let err = OpenAI::parse_error(502, "Bad Gateway");
            assert!(matches!(err, LlmError::HttpStatus { status: 502, .. }));
            assert!(err.is_retryable());
        }
    }
}
