//! OpenAI-compatible chat completion client.
//!
//! Works against any endpoint that speaks the Chat Completions protocol.
//! The defaults point at OpenRouter.

mod chat;
mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
