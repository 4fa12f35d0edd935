//! Provider backends.
//!
//! # Available Backends
//!
//! - [`openai`] - OpenAI-compatible chat completions (OpenRouter by default)
//! - [`elevenlabs`] - ElevenLabs text-to-speech

mod error;

pub mod elevenlabs;
pub mod openai;

pub use elevenlabs::{ElevenLabs, ElevenLabsConfig};
pub use error::LlmError;
pub use openai::{OpenAI, OpenAIConfig};
