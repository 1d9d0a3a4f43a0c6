use crate::error::{ParserError, YamlError};
use crate::node::{Depth, Node};
use crate::scanner::Scanner;
use crate::token::TokenType;

/// Nesting limit used when no [`ParserOptions`] are given.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest allowed collection nesting. Deeper input fails with `DepthLimitExceeded`.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One document of a stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub root: Node,
}

/// Splits a token stream into documents and parses each root node.
///
/// A stream may hold any number of documents, separated by `---` and optionally closed by
/// `...`. Input without markers is a single implicit document; input without content is no
/// document at all.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    options: ParserOptions,
    started: bool,
    finished: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, "source.yaml".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        Self {
            scanner: Scanner::new_with_name(source_text, name),
            options: ParserOptions::default(),
            started: false,
            finished: false,
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }

    /// Parses the next document, or returns `None` once the stream is exhausted.
    ///
    /// The first error ends the stream: later calls return `None`.
    pub fn next_document(&mut self) -> Result<Option<Document>, YamlError> {
        if self.finished {
            return Ok(None);
        }
        let result = self.parse_document();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn parse_document(&mut self) -> Result<Option<Document>, YamlError> {
        if !self.started {
            self.started = true;
            self.expect(TokenType::StreamStart, "the start of the stream")?;
        }

        // stray `...` markers carry no document
        while self.match_token(TokenType::DocumentEnd)? {}

        if self.scanner.check(TokenType::StreamEnd)? {
            self.scanner.pop_next_token()?;
            log::debug!("end of stream");
            return Ok(None);
        }

        let explicit = self.match_token(TokenType::DocumentStart)?;
        log::debug!(
            "{} document",
            if explicit { "explicit" } else { "implicit" }
        );

        let mut root = Node::default();
        root.parse_nested(&mut self.scanner, Depth::new(self.options.max_depth))?;

        // a closed document may be followed by anything; an open one only by the next document
        if !self.match_token(TokenType::DocumentEnd)?
            && !self.scanner.check(TokenType::DocumentStart)?
            && !self.scanner.check(TokenType::StreamEnd)?
        {
            return Err(self.unexpected("a document start or the end of the stream")?);
        }

        Ok(Some(Document { root }))
    }

    fn expect(&mut self, expected: TokenType, description: &str) -> Result<(), YamlError> {
        if self.match_token(expected)? {
            Ok(())
        } else {
            Err(self.unexpected(description)?)
        }
    }

    fn match_token(&mut self, ttype: TokenType) -> Result<bool, YamlError> {
        if self.scanner.check(ttype)? {
            self.scanner.pop_next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn unexpected(&mut self, expected: &str) -> Result<YamlError, YamlError> {
        let (mark, found) = self.scanner.next_token_summary()?;
        Ok(ParserError::unexpected_token(&self.scanner, mark, expected, found).into())
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Document, YamlError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_document().transpose()
    }
}
