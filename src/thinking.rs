//! Separation of "thinking" text from the user-facing reply.
//!
//! Models mark their reasoning in one of two ways:
//!
//! - a fenced block opened with a marker word: ```` ```thinking ```` or
//!   ```` ```思考 ````, closed by a plain ```` ``` ````
//! - a tag pair: `<think>…</think>`, `<thinking>…</thinking>` or
//!   `<思考>…</思考>`
//!
//! [`extract_thinking_content`] splits a complete text in one pass.
//! [`IncrementalSplitter`] routes streamed chunks as they arrive.

use std::sync::LazyLock;

use regex::Regex;

/// Whole-text patterns, tried in priority order. Each has one capture group
/// holding the thinking text.
static THINKING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)```thinking\n(.*?)\n```",
        r"(?is)```思考\n(.*?)\n```",
        r"(?is)<think>(.*?)</think>",
        r"(?is)<thinking>(.*?)</thinking>",
        r"(?is)<思考>(.*?)</思考>",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Any marker at all, well-formed or not.
static ANY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:thinking|思考)|</?(?:think|thinking|思考)>").expect("valid regex")
});

/// Opening or closing tag token, as seen by the incremental splitter.
static TAG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:think|thinking|思考)>").expect("valid regex"));

/// A message split into its thinking and reply parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    pub thinking: String,
    pub reply: String,
}

/// Split a complete text into thinking and reply.
///
/// The first pattern that matches wins. Its captured text, trimmed, is the
/// thinking part; the input with exactly that matched span removed, trimmed,
/// is the reply. Without a match the whole trimmed input is the reply.
///
/// # Example
/// ```
/// use agentdesk::thinking::extract_thinking_content;
///
/// let parsed = extract_thinking_content("```thinking\nplan A\n```\nHere is the answer");
/// assert_eq!(parsed.thinking, "plan A");
/// assert_eq!(parsed.reply, "Here is the answer");
/// ```
pub fn extract_thinking_content(content: &str) -> ParsedMessage {
    if content.is_empty() {
        return ParsedMessage::default();
    }

    for pattern in THINKING_PATTERNS.iter() {
        let Some(caps) = pattern.captures(content) else {
            continue;
        };
        let (Some(span), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let mut reply = String::with_capacity(content.len() - span.len());
        reply.push_str(&content[..span.start()]);
        reply.push_str(&content[span.end()..]);

        return ParsedMessage {
            thinking: inner.as_str().trim().to_string(),
            reply: reply.trim().to_string(),
        };
    }

    ParsedMessage {
        thinking: String::new(),
        reply: content.trim().to_string(),
    }
}

/// Whether any thinking marker appears anywhere in `content`.
pub fn has_thinking_content(content: &str) -> bool {
    ANY_MARKER.is_match(content)
}

/// Which buffer incoming text is routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Reply,
    Thinking,
}

/// Two-state router for streamed chunks.
///
/// Each chunk is scanned on its own for tag tokens. Text before a token goes
/// to the current section; an opening token switches to [`Section::Thinking`]
/// and a closing token to [`Section::Reply`]; the rest of the chunk goes to
/// the new section. Fenced markers are only recognized by
/// [`extract_thinking_content`].
///
/// A token split across two chunks is not recognized and lands in whichever
/// buffer is current, as ordinary text.
#[derive(Debug, Clone, Default)]
pub struct IncrementalSplitter {
    section: Section,
    thinking: String,
    reply: String,
}

impl IncrementalSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one chunk.
    pub fn push(&mut self, chunk: &str) {
        let mut rest = 0;
        for token in TAG_TOKEN.find_iter(chunk) {
            self.route(&chunk[rest..token.start()]);
            self.section = if token.as_str().starts_with("</") {
                Section::Reply
            } else {
                Section::Thinking
            };
            rest = token.end();
        }
        self.route(&chunk[rest..]);
    }

    fn route(&mut self, text: &str) {
        match self.section {
            Section::Reply => self.reply.push_str(text),
            Section::Thinking => self.thinking.push_str(text),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn thinking(&self) -> &str {
        &self.thinking
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// The buffers accumulated so far, untrimmed.
    pub fn into_parsed(self) -> ParsedMessage {
        ParsedMessage {
            thinking: self.thinking,
            reply: self.reply,
        }
    }
}
