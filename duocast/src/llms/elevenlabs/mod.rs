//! ElevenLabs text-to-speech client.
//!
//! Requests raw PCM (`pcm_<rate>`) so clips can be joined losslessly.

mod client;
mod config;
mod speech;

pub use client::ElevenLabs;
pub use config::ElevenLabsConfig;
