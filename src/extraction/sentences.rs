//! Sentence extraction and filtering
//!
//! Article text goes through three steps:
//!
//! 1. Whitespace normalization: newlines, carriage returns and tabs become
//!    spaces, runs of spaces collapse to one, and the ends are trimmed.
//! 2. Sentence split: a sentence starts with an uppercase letter and runs up
//!    to and including the first `.`, `!` or `?`.
//! 3. Language filter: only sentences matching the language's pattern
//!    (case-insensitive) are kept.

use crate::Result;
use regex::{Regex, RegexBuilder};

/// Sentence candidate: uppercase letter up to the first terminator
const SENTENCE_PATTERN: &str = r"\p{Lu}[^.!?]*[.!?]";

/// Returns the sentence pattern for a language tag
///
/// | Language | Pattern |
/// |----------|---------|
/// | `en` | durations in days (`(last\|took\|take).*day`) |
/// | `sr` | durations in days, Latin or Cyrillic (`(traja\|траја).*(dan\|дан)`) |
/// | other | every sentence |
pub fn language_pattern(language: &str) -> &'static str {
    match language {
        "en" => r"(last|took|take).*day",
        "sr" => r"(traja|траја).*(dan|дан)",
        _ => r".*",
    }
}

/// Replaces `\n`, `\r` and `\t` with spaces, collapses runs of spaces, and trims
pub fn normalize_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut previous_space = false;

    for c in text.chars() {
        let c = match c {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        };

        if c == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        normalized.push(c);
    }

    normalized.trim_matches(' ').to_string()
}

/// Finds sentences in text and keeps those matching a pattern
#[derive(Debug, Clone)]
pub struct SentenceFilter {
    splitter: Regex,
    matcher: Regex,
}

impl SentenceFilter {
    /// Filter for a language tag (see [`language_pattern`])
    pub fn for_language(language: &str) -> Result<Self> {
        Self::with_pattern(language_pattern(language))
    }

    /// Filter using a custom pattern, matched case-insensitively
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            splitter: Regex::new(SENTENCE_PATTERN)?,
            matcher: RegexBuilder::new(pattern).case_insensitive(true).build()?,
        })
    }

    /// Splits normalized text into sentence candidates, in document order
    pub fn split_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.splitter.find_iter(text).map(|m| m.as_str()).collect()
    }

    pub fn is_match(&self, sentence: &str) -> bool {
        self.matcher.is_match(sentence)
    }

    /// Normalizes `text` and returns the matching sentences in order
    pub fn matching_sentences(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        self.split_sentences(&normalized)
            .into_iter()
            .filter(|sentence| self.is_match(sentence))
            .map(str::to_string)
            .collect()
    }
}
