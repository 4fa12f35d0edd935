//! Duocast - two-host podcasts from book summaries
//!
//! This crate turns books into a dialogue podcast: books are summarized by a
//! chat model, core topics are drawn from the summaries, a script writer
//! produces an emotion-tagged transcript, and the [`transcript`] parser and
//! [`assembler`] render it to a single audio file with a speech provider.

pub mod assembler;
pub mod audio;
pub mod chat;
pub mod config;
pub mod corpus;
pub mod error;
pub mod llms;
pub mod pipeline;
pub mod prelude;
pub mod prompts;
pub mod retry;
pub mod summary;
pub mod topics;
pub mod transcript;
pub mod writer;

pub use error::{Error, LlmError, Result, TranscriptError};
