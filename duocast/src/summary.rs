//! Book summarization.
//!
//! Long texts are split into word-aligned chunks, each chunk is summarized,
//! and the chunk summaries are merged. Several books are merged once more
//! into a single summary.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::chat::{ChatRequest, SharedChatProvider};
use crate::config::SummaryConfig;
use crate::error::{Error, Result};
use crate::llms::LlmError;
use crate::prompts::{PromptEngine, TemplateContext, templates};
use crate::retry::{RetryConfig, retry};

/// Split `text` on whitespace into chunks of at most `chunk_size` characters.
///
/// Every word counts its length plus one separator. A single word longer
/// than `chunk_size` becomes its own chunk. No chunk is empty.
#[must_use]
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0;

    for word in text.split_whitespace() {
        let word_size = word.chars().count() + 1;
        if current_size + word_size > chunk_size && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_size = 0;
        }
        current.push(word);
        current_size += word_size;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

/// Read a source document as plain text.
///
/// `.pdf` files need the `pdf` feature; everything else is read as UTF-8.
///
/// # Errors
///
/// Returns an error if the file cannot be read or extracted.
pub async fn extract_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        return extract_pdf(path.to_path_buf()).await;
    }

    Ok(tokio::fs::read_to_string(path).await?)
}

#[cfg(feature = "pdf")]
async fn extract_pdf(path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let doc = lopdf::Document::load(&path)
            .map_err(|e| Error::document(format!("{}: {e}", path.display())))?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages)
            .map_err(|e| Error::document(format!("{}: {e}", path.display())))
    })
    .await
    .map_err(|e| Error::document(format!("PDF extraction task failed: {e}")))?
}

#[cfg(not(feature = "pdf"))]
#[allow(clippy::unused_async)]
async fn extract_pdf(path: PathBuf) -> Result<String> {
    Err(Error::document(format!(
        "{}: PDF support requires the `pdf` feature",
        path.display()
    )))
}

/// Summarizes books through a chat model.
#[derive(Clone)]
pub struct Summarizer {
    provider: SharedChatProvider,
    model: Option<String>,
    config: SummaryConfig,
    engine: PromptEngine,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Summarizer {
    /// Create a summarizer using the provider's default model.
    #[must_use]
    pub fn new(provider: SharedChatProvider, config: SummaryConfig) -> Self {
        Self {
            provider,
            model: None,
            config,
            engine: PromptEngine::new(),
        }
    }

    /// Use a specific model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Summarize one chunk toward the configured chunk target length.
    ///
    /// # Errors
    ///
    /// Returns the last error once all attempts fail.
    pub async fn summarize_chunk(&self, chunk: &str) -> Result<String> {
        let prompt = self.engine.render(
            templates::SUMMARIZE_CHUNK,
            &TemplateContext::new()
                .with_var("text", chunk)
                .with_var("target_length", self.config.chunk_target_length),
        )?;
        let policy = RetryConfig::fixed(self.config.max_attempts, self.config.chunk_retry_delay_secs);
        retry(&policy, "summarize_chunk", || self.ask(&prompt)).await
    }

    /// Merge summaries into one of roughly `target_length` characters.
    ///
    /// # Errors
    ///
    /// Returns the last error once all attempts fail.
    pub async fn combine_summaries(&self, summaries: &[String], target_length: usize) -> Result<String> {
        let prompt = self.engine.render(
            templates::COMBINE_SUMMARIES,
            &TemplateContext::new()
                .with_var("summaries", summaries.join("\n\n"))
                .with_var("target_length", target_length),
        )?;
        let policy =
            RetryConfig::fixed(self.config.max_attempts, self.config.combine_retry_delay_secs);
        retry(&policy, "combine_summaries", || self.ask(&prompt)).await
    }

    /// Chunk, summarize and merge one text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty or a model call fails.
    pub async fn summarize_text(&self, text: &str, target_length: usize) -> Result<String> {
        let chunks = chunk_text(text, self.config.chunk_size);
        if chunks.is_empty() {
            return Err(Error::document("document contains no text"));
        }

        let mut summaries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            info!(chunk = i + 1, total = chunks.len(), "summarizing chunk");
            summaries.push(self.summarize_chunk(chunk).await?);
        }

        self.combine_summaries(&summaries, target_length).await
    }

    /// Summarize several books into one text and write it to `output`.
    ///
    /// Each book gets an equal share of the combined target length before
    /// the per-book summaries are merged.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no sources, a source cannot be read, a
    /// model call fails, or the output cannot be written.
    pub async fn summarize_documents(&self, sources: &[PathBuf], output: &Path) -> Result<String> {
        if sources.is_empty() {
            return Err(Error::document("no source documents given"));
        }

        let per_book = self.config.combined_target_length / sources.len();
        let mut book_summaries = Vec::with_capacity(sources.len());
        for source in sources {
            info!(path = %source.display(), "processing document");
            let text = extract_text(source).await?;
            book_summaries.push(self.summarize_text(&text, per_book).await?);
        }

        let summary = self
            .combine_summaries(&book_summaries, self.config.combined_target_length)
            .await?;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, &summary).await?;
        info!(path = %output.display(), chars = summary.chars().count(), "saved summary");

        Ok(summary)
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        let model = self
            .model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model());
        let response = self.provider.chat(&ChatRequest::new(model).user(prompt)).await?;
        let text = response.text().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::response_format("non-empty summary", "empty response").into());
        }
        debug!(chars = text.chars().count(), "model returned summary");
        Ok(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::chat::{ChatProvider, ChatResponse};

    mod chunking {
        use super::*;

        #[test]
        fn packs_words_greedily() {
            // "aaa " = 4, "bb " = 3, "c " = 2
            assert_eq!(chunk_text("aaa bb c", 7), vec!["aaa bb", "c"]);
            assert_eq!(chunk_text("aaa bb c", 9), vec!["aaa bb c"]);
        }

        #[test]
        fn oversize_word_stands_alone() {
            assert_eq!(
                chunk_text("a enormousword b", 5),
                vec!["a", "enormousword", "b"]
            );
        }

        #[test]
        fn no_empty_chunks() {
            assert!(chunk_text("   \n\t ", 10).is_empty());
            assert!(chunk_text("longerthanlimit", 3).iter().all(|c| !c.is_empty()));
        }

        #[test]
        fn counts_characters_not_bytes() {
            assert_eq!(chunk_text("注意力 习惯", 4), vec!["注意力", "习惯"]);
            assert_eq!(chunk_text("注意力 习惯", 7), vec!["注意力 习惯"]);
        }
    }

    /// Replies from a queue and records prompts.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatProvider for Scripted {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("fallback".into()))?;
            Ok(ChatResponse::text_only(reply))
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }

        fn default_model(&self) -> &str {
            "scripted-1"
        }
    }

    fn quick_config() -> SummaryConfig {
        SummaryConfig {
            chunk_size: 10,
            chunk_retry_delay_secs: 0,
            combine_retry_delay_secs: 0,
            ..SummaryConfig::default()
        }
    }

    #[tokio::test]
    async fn chunk_retries_then_succeeds() {
        let provider = Scripted::new(vec![
            Err(LlmError::network("reset").into()),
            Ok("summary".into()),
        ]);
        let summarizer = Summarizer::new(provider.clone(), quick_config());

        assert_eq!(summarizer.summarize_chunk("text").await.unwrap(), "summary");
        assert_eq!(provider.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_combine_response_is_retried() {
        let provider = Scripted::new(vec![Ok("   ".into()), Ok("merged".into())]);
        let summarizer = Summarizer::new(provider, quick_config());

        let out = summarizer
            .combine_summaries(&["a".into(), "b".into()], 100)
            .await
            .unwrap();
        assert_eq!(out, "merged");
    }

    #[tokio::test]
    async fn last_error_surfaces() {
        let provider = Scripted::new(vec![
            Err(LlmError::http_status(500, "one").into()),
            Err(LlmError::http_status(500, "two").into()),
            Err(LlmError::http_status(500, "three").into()),
        ]);
        let summarizer = Summarizer::new(provider, quick_config());

        let err = summarizer.summarize_chunk("x").await.unwrap_err();
        assert!(err.to_string().contains("three"));
    }

    #[tokio::test]
    async fn documents_split_target_across_books() {
        let dir = tempfile::tempdir().unwrap();
        let book_a = dir.path().join("a.txt");
        let book_b = dir.path().join("b.md");
        tokio::fs::write(&book_a, "alphabet").await.unwrap();
        tokio::fs::write(&book_b, "gamma").await.unwrap();
        let output = dir.path().join("out").join("summary.txt");

        let provider = Scripted::new(Vec::new());
        let summarizer = Summarizer::new(provider.clone(), quick_config());
        let summary = summarizer
            .summarize_documents(&[book_a, book_b], &output)
            .await
            .unwrap();

        assert_eq!(summary, "fallback");
        assert_eq!(tokio::fs::read_to_string(&output).await.unwrap(), "fallback");

        let prompts = provider.prompts.lock().unwrap();
        // chunk + combine per book, then the final merge
        assert_eq!(prompts.len(), 5);
        assert!(prompts[1].contains("15000 characters"));
        assert!(prompts[4].contains("30000 characters"));
    }

    #[tokio::test]
    async fn no_sources_is_error() {
        let summarizer = Summarizer::new(Scripted::new(Vec::new()), quick_config());
        let dir = tempfile::tempdir().unwrap();
        let err = summarizer
            .summarize_documents(&[], &dir.path().join("s.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[cfg(not(feature = "pdf"))]
    #[tokio::test]
    async fn pdf_without_feature_is_document_error() {
        let err = extract_text(Path::new("book.pdf")).await.unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }
}
