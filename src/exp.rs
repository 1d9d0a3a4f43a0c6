//! Lexical patterns used by the scanner.
//!
//! Every pattern is anchored at the start of the unread input. Matching never consumes anything;
//! on success the caller learns how many characters the pattern covered and decides whether to
//! eat them.

use crate::stream::Stream;
use once_cell::sync::Lazy;
use regex::Regex;

/// A compiled, start-anchored lexical pattern.
#[derive(Debug)]
pub struct Pattern {
    name: &'static str,
    regex: Regex,
}

impl Pattern {
    fn new(name: &'static str, source: &str) -> Self {
        let regex = Regex::new(source).expect("lexical patterns are valid regular expressions");
        Self { name, regex }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Trial match against the upcoming characters.
    pub fn matches(&self, stream: &Stream<'_>) -> bool {
        self.regex.is_match(stream.remaining())
    }

    /// Number of characters the pattern covers at the current position, if it matches.
    pub fn match_len(&self, stream: &Stream<'_>) -> Option<usize> {
        self.regex
            .find(stream.remaining())
            .map(|m| m.as_str().chars().count())
    }
}

pub static BREAK: Lazy<Pattern> = Lazy::new(|| Pattern::new("break", r"^(?:\r\n|\n|\r)"));

pub static BLANK: Lazy<Pattern> = Lazy::new(|| Pattern::new("blank", r"^[ \t]"));

pub static COMMENT: Lazy<Pattern> = Lazy::new(|| Pattern::new("comment", r"^#"));

pub static DOC_START: Lazy<Pattern> =
    Lazy::new(|| Pattern::new("document start", r"^---(?:[ \t\r\n]|$)"));

pub static DOC_END: Lazy<Pattern> =
    Lazy::new(|| Pattern::new("document end", r"^\.\.\.(?:[ \t\r\n]|$)"));

pub static BLOCK_ENTRY: Lazy<Pattern> =
    Lazy::new(|| Pattern::new("block entry", r"^-(?:[ \t\r\n]|$)"));

pub static KEY: Lazy<Pattern> = Lazy::new(|| Pattern::new("key", r"^\?(?:[ \t\r\n]|$)"));

pub static KEY_IN_FLOW: Lazy<Pattern> =
    Lazy::new(|| Pattern::new("key in flow", r"^\?(?:[ \t\r\n,\[\]{}]|$)"));

pub static VALUE: Lazy<Pattern> = Lazy::new(|| Pattern::new("value", r"^:(?:[ \t\r\n]|$)"));

pub static VALUE_IN_FLOW: Lazy<Pattern> =
    Lazy::new(|| Pattern::new("value in flow", r"^:(?:[ \t\r\n,\[\]{}]|$)"));

pub static FLOW_INDICATOR: Lazy<Pattern> =
    Lazy::new(|| Pattern::new("flow indicator", r"^[,\[\]{}]"));

/// First character(s) of a plain scalar in block context.
pub static PLAIN_SCALAR: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(
        "plain scalar",
        r#"^(?:[^-?:,\[\]{}#&*!|>'"%@` \t\r\n]|[-?:][^ \t\r\n])"#,
    )
});

/// First character(s) of a plain scalar inside `[...]` or `{...}`.
pub static PLAIN_SCALAR_IN_FLOW: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(
        "plain scalar in flow",
        r#"^(?:[^-?:,\[\]{}#&*!|>'"%@` \t\r\n]|[-?:][^ \t\r\n,\[\]{}])"#,
    )
});
