//! Core topics: generation, persistence and selection.
//!
//! Models are asked for JSON of the form
//! `{"core_topics": [{"topic": ..., "explanation": ...}]}` but do not always
//! comply. Raw output is therefore kept verbatim when it does not parse.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chat::{ChatProvider, ChatRequest};
use crate::error::{Error, Result};
use crate::prompts::{PromptEngine, TemplateContext, templates};

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?\b|分钟)").expect("valid regex")
});

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("valid regex")
});

/// One discussion topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreTopic {
    /// Topic title.
    #[serde(alias = "core_topic")]
    pub topic: String,
    /// What the hosts should cover.
    #[serde(default)]
    pub explanation: String,
    /// Bridge to the next topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    /// How the topic unfolds within the episode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_structure: Option<String>,
}

/// The topic list produced by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSet {
    /// Topics in discussion order.
    #[serde(default)]
    pub core_topics: Vec<CoreTopic>,
}

impl TopicSet {
    /// Parse model output, tolerating a surrounding Markdown code fence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the content is not a topic set.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        Ok(serde_json::from_str(body)?)
    }

    /// Number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core_topics.len()
    }

    /// Whether there are no topics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core_topics.is_empty()
    }

    /// Pick a topic.
    ///
    /// An out-of-range index falls back to a random pick.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Topic`] if the set is empty.
    pub fn select(&self, selection: TopicSelection) -> Result<&CoreTopic> {
        if self.core_topics.is_empty() {
            return Err(Error::topic("no core topics to choose from"));
        }

        let index = match selection {
            TopicSelection::Index(i) if i < self.core_topics.len() => i,
            TopicSelection::Index(i) => {
                let pick = fastrand::usize(..self.core_topics.len());
                warn!(requested = i, picked = pick, "topic index out of range, choosing randomly");
                pick
            }
            TopicSelection::Random => fastrand::usize(..self.core_topics.len()),
        };

        let topic = &self.core_topics[index];
        info!(index, topic = %topic.topic, "selected topic");
        Ok(topic)
    }
}

/// How to choose a topic from a [`TopicSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicSelection {
    /// Zero-based index.
    Index(usize),
    /// Uniformly random.
    Random,
}

/// Where [`save_topics`] put the model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedTopics {
    /// Parsed and pretty-printed as JSON.
    Json(PathBuf),
    /// Not valid JSON; written verbatim.
    RawText(PathBuf),
}

impl SavedTopics {
    /// Path of the written file.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Json(path) | Self::RawText(path) => path,
        }
    }
}

/// Ask the model for the core topics of a text; it decides how many.
///
/// # Errors
///
/// Returns an error if rendering or the model call fails.
pub async fn extract_core_topics(
    provider: &dyn ChatProvider,
    model: Option<&str>,
    text: &str,
) -> Result<String> {
    let prompt = PromptEngine::new().render(
        templates::EXTRACT_CORE_TOPICS,
        &TemplateContext::new().with_var("text_content", text),
    )?;
    request_text(provider, model, prompt).await
}

/// Ask the model for topics of a themed episode: 3 under five minutes, else 5.
///
/// # Errors
///
/// Returns an error if rendering or the model call fails.
pub async fn generate_core_topics(
    provider: &dyn ChatProvider,
    model: Option<&str>,
    theme: &str,
    summary: &str,
    duration_minutes: u32,
) -> Result<String> {
    let prompt = PromptEngine::new().render(
        templates::GENERATE_CORE_TOPICS,
        &TemplateContext::new()
            .with_var("podcast_theme", theme)
            .with_var("book_summary", summary)
            .with_var("duration_minutes", duration_minutes),
    )?;
    request_text(provider, model, prompt).await
}

async fn request_text(
    provider: &dyn ChatProvider,
    model: Option<&str>,
    prompt: String,
) -> Result<String> {
    let model = model.unwrap_or_else(|| provider.default_model());
    debug!(model, provider = provider.provider_name(), "requesting core topics");
    let response = provider.chat(&ChatRequest::new(model).user(prompt)).await?;
    Ok(response.text().unwrap_or_default())
}

/// Persist model output.
///
/// Valid JSON is pretty-printed to `path`. Anything else is written verbatim
/// to `path` with a `.txt` extension.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_topics(raw: &str, path: &Path) -> Result<SavedTopics> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    match serde_json::from_str::<serde_json::Value>(strip_code_fence(raw)) {
        Ok(value) => {
            tokio::fs::write(path, serde_json::to_string_pretty(&value)?).await?;
            info!(path = %path.display(), "saved core topics");
            Ok(SavedTopics::Json(path.to_path_buf()))
        }
        Err(e) => {
            let txt = path.with_extension("txt");
            tokio::fs::write(&txt, raw).await?;
            warn!(path = %txt.display(), error = %e, "topics are not valid JSON, saved as text");
            Ok(SavedTopics::RawText(txt))
        }
    }
}

/// Load topics from `path`, falling back to a sibling `.txt` file.
///
/// # Errors
///
/// Returns an error if neither file holds a parseable topic set.
pub async fn load_topics(path: &Path) -> Result<TopicSet> {
    let primary = match tokio::fs::read_to_string(path).await {
        Ok(content) => TopicSet::parse(&content),
        Err(e) => Err(e.into()),
    };

    match primary {
        Ok(set) => Ok(set),
        Err(err) => {
            let txt = path.with_extension("txt");
            if txt == path || !txt.exists() {
                return Err(err);
            }
            debug!(path = %txt.display(), error = %err, "falling back to text topics");
            let content = tokio::fs::read_to_string(&txt).await?;
            TopicSet::parse(&content)
        }
    }
}

/// Total minutes mentioned in topic text, or `default` when none are.
///
/// Matches forms like `5 minutes`, `3 min` and `10分钟`.
#[must_use]
pub fn duration_from_topics(text: &str, default: u32) -> u32 {
    let total: u32 = DURATION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .fold(0, u32::saturating_add);

    if total == 0 { default } else { total }
}

fn strip_code_fence(raw: &str) -> &str {
    FENCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |m| m.as_str())
}
