//! Chat completion types and the provider trait.
//!
//! Every model call in the pipeline (summaries, topics, scripts) goes
//! through a [`ChatProvider`]. The default implementation is the
//! OpenAI-compatible client in [`crate::llms::openai`]; tests substitute
//! scripted providers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Get the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier. Empty means the provider default.
    #[serde(default)]
    pub model: String,

    /// Conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Creates a new request with the specified model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Adds a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Adds a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the token limit.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of output.
    #[default]
    Stop,
    /// Token limit reached.
    Length,
    /// Output withheld by a content filter.
    ContentFilter,
}

/// A chat completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant text, if any was returned.
    pub content: Option<String>,
    /// Why generation ended.
    #[serde(default)]
    pub stop_reason: StopReason,
    /// Model that produced the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatResponse {
    /// Create a response carrying the given text.
    #[must_use]
    pub fn text_only(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// The assistant text.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.content.clone()
    }
}

/// A backend able to answer chat completion requests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a chat completion request and receive a complete response.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Get the name of this provider.
    ///
    /// Used for error messages and logging.
    fn provider_name(&self) -> &'static str;

    /// The model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;
}

/// Convenience helpers on top of [`ChatProvider`].
#[async_trait]
pub trait ChatProviderExt: ChatProvider {
    /// Send a single user prompt and return the text answer.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(self.default_model()).user(prompt);
        let response = self.chat(&request).await?;
        Ok(response.text().unwrap_or_default())
    }

    /// Send a prompt with a system message.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(self.default_model())
            .system(system)
            .user(prompt);
        let response = self.chat(&request).await?;
        Ok(response.text().unwrap_or_default())
    }

    /// Send a prompt to a specific model.
    async fn complete_with_model(&self, model: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(model).user(prompt);
        let response = self.chat(&request).await?;
        Ok(response.text().unwrap_or_default())
    }
}

impl<T: ChatProvider + ?Sized> ChatProviderExt for T {}

/// Type alias for an Arc-wrapped ChatProvider.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod chat_request {
        use super::*;

        #[test]
        fn builder_appends_messages_in_order() {
            let req = ChatRequest::new("m").system("be brief").user("hello");
            assert_eq!(req.model, "m");
            assert_eq!(req.messages[0], Message::system("be brief"));
            assert_eq!(req.messages[1].role, Role::User);
        }

        #[test]
        fn optional_fields_skipped() {
            let json = serde_json::to_string(&ChatRequest::new("m")).unwrap();
            assert!(!json.contains("temperature"));
            assert!(!json.contains("max_tokens"));
        }
    }

    mod provider_ext {
        use super::*;

        struct Echo;

        #[async_trait]
        impl ChatProvider for Echo {
            async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
                let joined = request
                    .messages
                    .iter()
                    .map(|m| format!("{}:{}", m.role.as_str(), m.content))
                    .collect::<Vec<_>>()
                    .join("|");
                Ok(ChatResponse::text_only(format!("{}/{joined}", request.model)))
            }

            fn provider_name(&self) -> &'static str {
                "echo"
            }

            fn default_model(&self) -> &str {
                "echo-1"
            }
        }

        #[tokio::test]
        async fn complete_uses_default_model() {
            let out = Echo.complete("hi").await.unwrap();
            assert_eq!(out, "echo-1/user:hi");
        }

        #[tokio::test]
        async fn complete_with_system_orders_messages() {
            let out = Echo.complete_with_system("sys", "hi").await.unwrap();
            assert_eq!(out, "echo-1/system:sys|user:hi");
        }

        #[tokio::test]
        async fn works_through_shared_handle() {
            let shared: SharedChatProvider = Arc::new(Echo);
            let out = shared.complete_with_model("other", "x").await.unwrap();
            assert_eq!(out, "other/user:x");
        }
    }
}
