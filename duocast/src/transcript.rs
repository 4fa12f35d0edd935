//! Dialogue transcript parsing.
//!
//! A transcript is the raw text returned by the script-writing model. It is
//! split into sections by separator lines (any line containing
//! [`SEPARATOR_TOKEN`]) and carries one utterance per marker line:
//!
//! ```text
//! ****** opening ******
//! A [excited]: Welcome back to the show!
//! B [calm]: Glad to be here.
//! Today we are talking about attention.
//! ```
//!
//! Lines without a marker continue the utterance that is currently open.
//! A separator ends the open utterance, and unmarked lines after it start a
//! new one for the same speaker and emotion. What happens to text that cannot be attributed is decided by
//! [`ParseMode`].

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Literal token that marks a structural boundary in a transcript.
pub const SEPARATOR_TOKEN: &str = "******";

static DEFAULT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&marker_pattern(&["A", "B"])).expect("valid regex")
});

static DEFAULT_UNTERMINATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&unterminated_pattern(&["A", "B"])).expect("valid regex")
});

/// One of the two podcast hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Speaker {
    /// First host.
    A,
    /// Second host.
    B,
}

impl Speaker {
    /// Get the canonical tag of the speaker.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attributed utterance extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSegment {
    speaker: Speaker,
    emotion: Option<String>,
    text: String,
}

impl DialogueSegment {
    /// Create a new segment.
    #[must_use]
    pub fn new(speaker: Speaker, emotion: Option<String>, text: impl Into<String>) -> Self {
        Self {
            speaker,
            emotion,
            text: text.into(),
        }
    }

    /// The host speaking this segment.
    #[must_use]
    pub const fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// The bracketed emotion, if the marker carried one.
    #[must_use]
    pub fn emotion(&self) -> Option<&str> {
        self.emotion.as_deref()
    }

    /// The spoken text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Policy for transcript lines that cannot be attributed to a speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Drop orphan lines and keep malformed markers as continuation text,
    /// logging both.
    #[default]
    Lenient,
    /// Reject the transcript at the first orphan line or malformed marker.
    Strict,
}

/// Transcript rejected under [`ParseMode::Strict`], or a bad parser setup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TranscriptError {
    /// Text appeared where no speaker was open.
    #[error("line {line}: text outside any speaker turn: {content:?}")]
    OrphanLine {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },

    /// A speaker marker opened an emotion bracket without closing it.
    #[error("line {line}: unterminated emotion bracket: {content:?}")]
    UnterminatedEmotion {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },

    /// A speaker alias was empty or claimed by both speakers.
    #[error("invalid speaker alias {0:?}")]
    InvalidAlias(String),
}

impl TranscriptError {
    /// Create an orphan line error.
    #[must_use]
    pub fn orphan_line(line: usize, content: impl Into<String>) -> Self {
        Self::OrphanLine {
            line,
            content: content.into(),
        }
    }

    /// Create an unterminated emotion error.
    #[must_use]
    pub fn unterminated_emotion(line: usize, content: impl Into<String>) -> Self {
        Self::UnterminatedEmotion {
            line,
            content: content.into(),
        }
    }
}

/// Converts transcript text into ordered [`DialogueSegment`]s.
///
/// Speaker tokens `A` and `B` are always recognised. Host names can be
/// registered as aliases so that `Samuel [calm]: ...` maps to [`Speaker::A`].
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    mode: ParseMode,
    marker: Regex,
    unterminated: Regex,
    speakers: HashMap<String, Speaker>,
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new(ParseMode::default())
    }
}

impl TranscriptParser {
    /// Create a parser that recognises only the `A` and `B` tokens.
    #[must_use]
    pub fn new(mode: ParseMode) -> Self {
        Self {
            mode,
            marker: DEFAULT_MARKER_RE.clone(),
            unterminated: DEFAULT_UNTERMINATED_RE.clone(),
            speakers: default_speakers(),
        }
    }

    /// Create a parser that also recognises the given host names.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::InvalidAlias`] if an alias is blank or is
    /// registered for both speakers.
    pub fn with_aliases<S: AsRef<str>>(
        mode: ParseMode,
        speaker_a: &[S],
        speaker_b: &[S],
    ) -> Result<Self, TranscriptError> {
        let mut speakers = default_speakers();

        for (aliases, speaker) in [(speaker_a, Speaker::A), (speaker_b, Speaker::B)] {
            for alias in aliases {
                let alias = alias.as_ref().trim();
                if alias.is_empty() {
                    return Err(TranscriptError::InvalidAlias(alias.to_owned()));
                }
                match speakers.insert(alias.to_owned(), speaker) {
                    Some(existing) if existing != speaker => {
                        return Err(TranscriptError::InvalidAlias(alias.to_owned()));
                    }
                    _ => {}
                }
            }
        }

        // Longest first so that "Alexandra" wins over "Alex".
        let mut tokens: Vec<&str> = speakers.keys().map(String::as_str).collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let marker = Regex::new(&marker_pattern(&tokens))
            .map_err(|e| TranscriptError::InvalidAlias(e.to_string()))?;
        let unterminated = Regex::new(&unterminated_pattern(&tokens))
            .map_err(|e| TranscriptError::InvalidAlias(e.to_string()))?;

        Ok(Self {
            mode,
            marker,
            unterminated,
            speakers,
        })
    }

    /// The malformed-input policy of this parser.
    #[must_use]
    pub const fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parse a transcript into segments, in line order.
    ///
    /// # Errors
    ///
    /// Only in [`ParseMode::Strict`]: returns the first orphan line or
    /// unterminated emotion bracket encountered.
    pub fn parse(&self, transcript: &str) -> Result<Vec<DialogueSegment>, TranscriptError> {
        let mut segments = Vec::new();
        let mut current: Option<DialogueSegment> = None;

        for (index, raw) in transcript.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }

            // A separator closes the open turn; its speaker and emotion carry
            // over to unmarked lines in the next section.
            if line.contains(SEPARATOR_TOKEN) {
                if let Some(open) = current.take() {
                    let carried = DialogueSegment::new(open.speaker, open.emotion.clone(), String::new());
                    flush(&mut segments, Some(open));
                    current = Some(carried);
                }
                continue;
            }

            if let Some(segment) = self.match_marker(line) {
                flush(&mut segments, current.take());
                current = Some(segment);
                continue;
            }

            if self.unterminated.is_match(line) {
                match self.mode {
                    ParseMode::Strict => {
                        return Err(TranscriptError::unterminated_emotion(line_no, line));
                    }
                    ParseMode::Lenient => {
                        warn!(line = line_no, content = line, "unterminated emotion bracket, kept as continuation");
                    }
                }
            }

            match current.as_mut() {
                Some(segment) => {
                    segment.text.push(' ');
                    segment.text.push_str(line);
                }
                None => match self.mode {
                    ParseMode::Strict => return Err(TranscriptError::orphan_line(line_no, line)),
                    ParseMode::Lenient => {
                        debug!(line = line_no, content = line, "dropping line outside any speaker turn");
                    }
                },
            }
        }

        flush(&mut segments, current.take());
        debug!(segments = segments.len(), "parsed transcript");
        Ok(segments)
    }

    fn match_marker(&self, line: &str) -> Option<DialogueSegment> {
        let caps = self.marker.captures(line)?;
        let speaker = *self.speakers.get(caps.name("speaker")?.as_str())?;
        let emotion = caps
            .name("emotion")
            .map(|m| m.as_str().trim())
            .filter(|e| !e.is_empty())
            .map(str::to_owned);
        let text = caps.name("text").map_or("", |m| m.as_str().trim());

        Some(DialogueSegment::new(speaker, emotion, text))
    }
}

fn default_speakers() -> HashMap<String, Speaker> {
    HashMap::from([("A".to_owned(), Speaker::A), ("B".to_owned(), Speaker::B)])
}

fn alternation<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| regex::escape(t.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

fn marker_pattern<S: AsRef<str>>(tokens: &[S]) -> String {
    format!(
        r"^(?P<speaker>{})\s*(?:\[(?P<emotion>[^\[\]]*)\])?\s*:\s*(?P<text>.*)$",
        alternation(tokens)
    )
}

fn unterminated_pattern<S: AsRef<str>>(tokens: &[S]) -> String {
    format!(r"^(?:{})\s*\[[^\]]*$", alternation(tokens))
}

fn flush(segments: &mut Vec<DialogueSegment>, pending: Option<DialogueSegment>) {
    let Some(mut segment) = pending else {
        return;
    };

    let trimmed = segment.text.trim();
    if trimmed.is_empty() {
        debug!(speaker = %segment.speaker, "skipping speaker turn without text");
        return;
    }
    if trimmed.len() != segment.text.len() {
        segment.text = trimmed.to_owned();
    }
    segments.push(segment);
}
