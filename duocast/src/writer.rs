//! Script generation.
//!
//! [`ScriptWriter`] turns a book summary and its topics into dialogue. Two
//! shapes are produced: a name-tagged script for a single topic, and a full
//! emotion-tagged transcript that the [`TranscriptParser`] can read.
//!
//! [`TranscriptParser`]: crate::transcript::TranscriptParser

use tracing::{debug, info};

use crate::chat::{ChatRequest, SharedChatProvider};
use crate::config::{EmotionConfig, PodcastConfig};
use crate::error::Result;
use crate::prompts::{HostProfiles, PromptEngine, TemplateContext, templates};
use crate::topics::{CoreTopic, duration_from_topics};

/// Writes podcast scripts through a chat model.
#[derive(Clone)]
pub struct ScriptWriter {
    provider: SharedChatProvider,
    model: Option<String>,
    podcast: PodcastConfig,
    emotions: EmotionConfig,
    engine: PromptEngine,
}

impl std::fmt::Debug for ScriptWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptWriter")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .field("podcast", &self.podcast)
            .finish_non_exhaustive()
    }
}

impl ScriptWriter {
    /// Create a writer.
    #[must_use]
    pub fn new(provider: SharedChatProvider, podcast: PodcastConfig, emotions: EmotionConfig) -> Self {
        Self {
            provider,
            model: None,
            podcast,
            emotions,
            engine: PromptEngine::new(),
        }
    }

    /// Use a specific model instead of the provider default.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Word budget for a script of `minutes`.
    #[must_use]
    pub const fn word_count(&self, minutes: u32) -> u32 {
        minutes.saturating_mul(self.podcast.words_per_minute)
    }

    /// Write a script about one topic with opening, content and closing
    /// sections. Speakers are labelled with the host names.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or the model call fails.
    pub async fn write_topic_script(
        &self,
        summary: &str,
        topic: &CoreTopic,
        hosts: &HostProfiles,
        minutes: u32,
    ) -> Result<String> {
        let selected = format!("{}\n{}", topic.topic, topic.explanation);
        let ctx = TemplateContext::new()
            .with_var("book_summary", summary)
            .with_var("selected_topic", selected.trim())
            .with_var("hosts", hosts.profile.as_str())
            .with_var("speaker_a", hosts.speaker_a.as_str())
            .with_var("speaker_b", hosts.speaker_b.as_str())
            .with_var("duration_minutes", minutes)
            .with_var("word_count", self.word_count(minutes));
        let prompt = self.engine.render(templates::TOPIC_SCRIPT, &ctx)?;

        info!(topic = %topic.topic, minutes, "writing topic script");
        self.ask(prompt).await
    }

    /// Write a full transcript with `A [emotion]:` / `B [emotion]:` lines.
    ///
    /// The duration is the sum of the minutes mentioned in `topics`, or the
    /// configured default when none are.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or the model call fails.
    pub async fn write_transcript(
        &self,
        summary: &str,
        topics: &str,
        hosts: &HostProfiles,
    ) -> Result<String> {
        let minutes = duration_from_topics(topics, self.podcast.default_duration_minutes);
        let emotions = self
            .emotions
            .expressive
            .iter()
            .chain(&self.emotions.steady)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let ctx = TemplateContext::new()
            .with_var("book_summary", summary)
            .with_var("core_topics", topics)
            .with_var("hosts", hosts.profile.as_str())
            .with_var("duration_minutes", minutes)
            .with_var("word_count", self.word_count(minutes))
            .with_var("emotions", emotions);
        let prompt = self.engine.render(templates::EMOTION_TRANSCRIPT, &ctx)?;

        info!(minutes, "writing transcript");
        self.ask(prompt).await
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        let model = self
            .model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model());
        let response = self.provider.chat(&ChatRequest::new(model).user(prompt)).await?;
        let text = response.text().unwrap_or_default();
        debug!(chars = text.chars().count(), "script received");
        Ok(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::chat::{ChatProvider, ChatResponse};

    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatProvider for Recorder {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());
            Ok(ChatResponse::text_only("A [calm]: hello"))
        }

        fn provider_name(&self) -> &'static str {
            "recorder"
        }

        fn default_model(&self) -> &str {
            "recorder-1"
        }
    }

    fn writer(provider: Arc<Recorder>) -> ScriptWriter {
        ScriptWriter::new(provider, PodcastConfig::default(), EmotionConfig::default())
    }

    #[tokio::test]
    async fn transcript_duration_from_topics() {
        let provider = Arc::new(Recorder::default());
        let out = writer(provider.clone())
            .write_transcript("summary", "Focus (4 minutes)\nHabits (6 minutes)", &HostProfiles::default())
            .await
            .unwrap();
        assert_eq!(out, "A [calm]: hello");

        let prompt = provider.prompts.lock().unwrap().remove(0);
        assert!(prompt.contains("Conversation Duration: 10 minutes (approximately 1500 words)"));
        assert!(prompt.contains("excited, enthusiastic"));
    }

    #[tokio::test]
    async fn transcript_falls_back_to_default_duration() {
        let provider = Arc::new(Recorder::default());
        writer(provider.clone())
            .write_transcript("summary", "no durations", &HostProfiles::default())
            .await
            .unwrap();

        let prompt = provider.prompts.lock().unwrap().remove(0);
        assert!(prompt.contains("20 minutes (approximately 3000 words)"));
    }

    #[tokio::test]
    async fn topic_script_uses_host_names() {
        let provider = Arc::new(Recorder::default());
        let topic = CoreTopic {
            topic: "Attention".into(),
            explanation: "Why focus is scarce".into(),
            transition: None,
            logical_structure: None,
        };
        writer(provider.clone())
            .write_topic_script("summary", &topic, &HostProfiles::default(), 3)
            .await
            .unwrap();

        let prompt = provider.prompts.lock().unwrap().remove(0);
        assert!(prompt.contains("Samuel: (opening remarks)"));
        assert!(prompt.contains("Alex: (response)"));
        assert!(prompt.contains("Attention\nWhy focus is scarce"));
        assert!(prompt.contains("approximately 450 words"));
    }
}
