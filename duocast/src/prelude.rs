//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use duocast::prelude::*;
//! ```

pub use crate::assembler::{AssemblyReport, AudioAssembler, VoiceCasting};
pub use crate::audio::{
    SharedSpeechProvider, SpeechClip, SpeechRequest, TextToSpeechProvider, Voice, VoiceSettings,
};
pub use crate::chat::{
    ChatProvider, ChatProviderExt, ChatRequest, ChatResponse, Message, Role, SharedChatProvider,
    StopReason,
};
pub use crate::config::{DuocastConfig, load_config, load_config_from};
pub use crate::error::{Error, LlmError, Result, TranscriptError};
pub use crate::llms::{ElevenLabs, ElevenLabsConfig, OpenAI, OpenAIConfig};
pub use crate::pipeline::{Pipeline, PodcastArtifacts};
pub use crate::prompts::HostProfiles;
pub use crate::summary::Summarizer;
pub use crate::topics::{CoreTopic, TopicSelection, TopicSet};
pub use crate::transcript::{DialogueSegment, ParseMode, Speaker, TranscriptParser};
pub use crate::writer::ScriptWriter;
