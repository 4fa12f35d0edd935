//! Unified error types for duocast.
//!
//! This module provides the error hierarchy covering:
//! - LLM and speech provider errors (authentication, rate limiting, etc.)
//! - Transcript parsing rejections
//! - Configuration, prompt rendering and audio assembly failures

pub use crate::config::ConfigError;
pub use crate::llms::LlmError;
pub use crate::prompts::RenderError;
pub use crate::transcript::TranscriptError;

/// Result type alias for duocast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for duocast.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Chat or speech provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Transcript rejected by the strict parser.
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Prompt template error.
    #[error("Prompt error: {0}")]
    Prompt(#[from] RenderError),

    /// Audio clips could not be combined.
    #[error("Audio error: {0}")]
    Audio(String),

    /// Assembly was asked to render a transcript without segments.
    #[error("Transcript contains no dialogue segments")]
    EmptyTranscript,

    /// Topic data was missing or unusable.
    #[error("Topic error: {0}")]
    Topic(String),

    /// Source document could not be read or extracted.
    #[error("Document error: {0}")]
    Document(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WAV encoding/decoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an audio error with a message.
    #[must_use]
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a topic error with a message.
    #[must_use]
    pub fn topic(msg: impl Into<String>) -> Self {
        Self::Topic(msg.into())
    }

    /// Create a document error with a message.
    #[must_use]
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Whether retrying the failed call could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Llm(err) => err.is_retryable(),
            _ => false,
        }
    }
}
