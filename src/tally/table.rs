//! Ordered word-count table.

use std::collections::HashMap;
use std::fmt;

use crate::core::constants::{COUNT_SEPARATOR, STOP_TOKEN};

/// Token counts in first-occurrence order.
///
/// Built once from input text and never mutated afterwards. Tokens are kept
/// verbatim: no case folding and no punctuation stripping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCount {
    entries: Vec<(String, u64)>,
}

impl WordCount {
    /// Count the tokens of `text` that precede the first lone `.` token.
    pub fn from_text(text: &str) -> Self {
        Self::from_tokens(text.split_whitespace())
    }

    /// Count `tokens` up to, and excluding, the first stop token.
    pub fn from_tokens<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(String, u64)> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for token in tokens.into_iter().take_while(|t| *t != STOP_TOKEN) {
            match index.get(token) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    index.insert(token, entries.len());
                    entries.push((token.to_string(), 1));
                }
            }
        }

        Self { entries }
    }

    /// Count for `token`, if it occurred.
    pub fn get(&self, token: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, count)| *count)
    }

    /// Entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no token was counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted tokens.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Serialize as newline-terminated `token-count` lines.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (token, count) in &self.entries {
            writeln!(f, "{token}{COUNT_SEPARATOR}{count}")?;
        }
        Ok(())
    }
}
