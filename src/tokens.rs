//! Script-aware word tokenization and page keys

use crate::error::{PopebooksError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Arabic extended stop mark (U+06DB), kept attached to the word it follows
pub const EXTENSION_MARK: char = '\u{06DB}';

#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageKey {
    pub book_id: i64,
    pub page_number: i64,
}

impl PageKey {
    pub fn new(book_id: i64, page_number: i64) -> Self {
        Self { book_id, page_number }
    }
}

/// Inclusive range of code points accepted as word characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptBlock {
    pub start: char,
    pub end: char,
}

impl ScriptBlock {
    pub const ARABIC: ScriptBlock = ScriptBlock { start: '\u{0600}', end: '\u{06FF}' };

    pub const fn new(start: char, end: char) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, c: char) -> bool {
        (self.start..=self.end).contains(&c)
    }
}

static ARABIC_TOKENIZER: LazyLock<Tokenizer> = LazyLock::new(|| {
    Tokenizer::new(&[ScriptBlock::ARABIC], Some(EXTENSION_MARK))
        .expect("arabic token pattern is valid")
});

/// Splits text into word tokens made of runs of accepted code points.
///
/// Whitespace splitting does not give correct word counts for Arabic text, so
/// tokens are found by scanning for runs inside the configured blocks. A run may
/// be followed by a single space and the trailing mark, which then belongs to
/// the same token. Anything outside the blocks is a separator.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    pub fn new(blocks: &[ScriptBlock], trailing_mark: Option<char>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(PopebooksError::Other("Tokenizer needs at least one script block".to_string()));
        }
        if let Some(block) = blocks.iter().find(|b| b.start > b.end) {
            return Err(PopebooksError::Other(format!(
                "Invalid script block U+{:04X}..U+{:04X}",
                block.start as u32, block.end as u32
            )));
        }

        let class: String = blocks
            .iter()
            .map(|b| format!("\\x{{{:X}}}-\\x{{{:X}}}", b.start as u32, b.end as u32))
            .collect();
        let mut pattern = format!("[{}]+", class);
        if let Some(mark) = trailing_mark {
            pattern.push_str(&format!("(?: \\x{{{:X}}})?", mark as u32));
        }

        let pattern = Regex::new(&pattern)
            .map_err(|e| PopebooksError::Other(format!("Invalid token pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Shared tokenizer for the Arabic block
    pub fn arabic() -> &'static Tokenizer {
        &ARABIC_TOKENIZER
    }

    /// Tokens in document order, borrowed from `text`
    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(text).map(|m| m.as_str())
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokens(text).map(str::to_string).collect()
    }
}

/// Tokenize with the default Arabic tokenizer
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::arabic().tokenize(text)
}
