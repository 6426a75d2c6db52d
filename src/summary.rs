//! Search result summaries: a window of tokens around the first matching word

use crate::normalize::comparison_key;
use crate::tokens::Tokenizer;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_SIZE: usize = 30;
pub const ELLIPSIS: &str = "...";

/// Markers placed around the matched token. Summaries are plain text unless a
/// highlight is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub open: String,
    pub close: String,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    tokenizer: Tokenizer,
    window_size: usize,
    highlight: Option<Highlight>,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl Summarizer {
    /// A window of zero tokens is treated as one
    pub fn new(window_size: usize) -> Self {
        Self {
            tokenizer: Tokenizer::arabic().clone(),
            window_size: window_size.max(1),
            highlight: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn summarize(&self, text: &str, query_word: &str) -> String {
        let tokens: Vec<&str> = self.tokenizer.tokens(text).collect();
        self.summarize_tokens(&tokens, query_word)
    }

    /// Summarize an already tokenized page
    pub fn summarize_tokens<S: AsRef<str>>(&self, tokens: &[S], query_word: &str) -> String {
        let limit = self.window_size;
        let key = comparison_key(query_word);

        let Some(word_index) = tokens.iter().position(|t| comparison_key(t.as_ref()) == key) else {
            // No token equals the query (phrases, partial words): lead with the page head
            return if tokens.len() <= limit {
                join(tokens)
            } else {
                format!("{}{}", join(&tokens[..limit]), ELLIPSIS)
            };
        };

        let start = word_index.saturating_sub(limit / 2);
        let end = tokens.len().min(start + limit);
        let window = &tokens[start..end];

        let summary = match &self.highlight {
            Some(highlight) => window
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    if start + i == word_index {
                        format!("{}{}{}", highlight.open, t.as_ref(), highlight.close)
                    } else {
                        t.as_ref().to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            None => join(window),
        };

        if window.len() < tokens.len() {
            format!("{}{}{}", ELLIPSIS, summary, ELLIPSIS)
        } else {
            summary
        }
    }
}

fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens.iter().map(|t| t.as_ref()).collect::<Vec<&str>>().join(" ")
}

/// Summarize `text` around the first token equal to `query_word`
pub fn summarize(text: &str, query_word: &str, window_size: usize) -> String {
    Summarizer::new(window_size).summarize(text, query_word)
}
