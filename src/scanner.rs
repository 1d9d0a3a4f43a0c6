use crate::error::{ScannerError, YamlError};
use crate::exp;
use crate::stream::{Mark, Stream};
use crate::token::{Token, TokenStatus, TokenType};
use miette::{NamedSource, SourceSpan};
use std::collections::VecDeque;

/// How far past its start (in bytes) a simple key may still be confirmed.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentKind {
    Sequence,
    Mapping,
}

/// A position where a simple key may begin, waiting for a `:` to confirm it.
#[derive(Debug, Clone)]
struct SimpleKey {
    mark: Mark,
    key_token: usize,
    map_start_token: Option<usize>,
    // Height of the indentation stack right after the tentative push.
    indent_height: Option<usize>,
}

/// The context-sensitive tokenizer.
///
/// Tokens are produced on demand and handed out in FIFO order. A token queued speculatively for
/// a simple key stays `Tentative` until a `:` confirms it or the lookahead window closes and
/// retracts it; nothing behind a tentative token is handed out before that decision is made.
pub struct Scanner<'a> {
    // Source name for diagnostics.
    name: String,
    input: &'a str,
    stream: Stream<'a>,
    tokens: VecDeque<Token>,
    tokens_taken: usize,
    // Open block indentation columns, strictly increasing. Empty means no indentation.
    indents: Vec<usize>,
    flow_level: usize,
    // One candidate slot per flow level; index 0 is block context.
    simple_keys: Vec<Option<SimpleKey>>,
    simple_key_allowed: bool,
    started_stream: bool,
    ended_stream: bool,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::new_with_name(input, "source.yaml".to_string())
    }

    pub fn new_with_name(input: &'a str, name: String) -> Self {
        Self {
            name,
            input,
            stream: Stream::new(input),
            tokens: VecDeque::new(),
            tokens_taken: 0,
            indents: Vec::new(),
            flow_level: 0,
            simple_keys: vec![None],
            simple_key_allowed: false,
            started_stream: false,
            ended_stream: false,
            failed: false,
        }
    }

    /// Collects every remaining confirmed token, up to and including `StreamEnd`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, YamlError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.get_next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    // === Token consumer interface ===

    /// Returns the next confirmed token without removing it.
    pub fn peek_next_token(&mut self) -> Result<Option<&Token>, YamlError> {
        if self.fill_queue()? {
            Ok(self.tokens.front())
        } else {
            Ok(None)
        }
    }

    /// Removes and drops the next confirmed token.
    pub fn pop_next_token(&mut self) -> Result<(), YamlError> {
        self.get_next_token().map(|_| ())
    }

    /// Removes the next confirmed token and hands it to the caller.
    ///
    /// Retracted tokens at the front of the queue are dropped for good. A tentative token at the
    /// front counts as absent: more input is scanned until its fate is known. Returns `None` once
    /// the stream has ended and the queue is drained.
    pub fn get_next_token(&mut self) -> Result<Option<Token>, YamlError> {
        if !self.fill_queue()? {
            return Ok(None);
        }
        let token = self.tokens.pop_front();
        if let Some(token) = &token {
            self.tokens_taken += 1;
            log::trace!("delivered {token}");
        }
        Ok(token)
    }

    /// Whether the next confirmed token has the same kind as `ttype`.
    pub fn check(&mut self, ttype: TokenType) -> Result<bool, YamlError> {
        Ok(self
            .peek_next_token()?
            .is_some_and(|token| token.is(&ttype)))
    }

    pub fn flow_level(&self) -> usize {
        self.flow_level
    }

    pub fn mark(&self) -> Mark {
        self.stream.mark()
    }

    pub fn is_stream_ended(&self) -> bool {
        self.ended_stream
    }

    // Ensures a confirmed token is at the front of the queue, scanning as needed.
    fn fill_queue(&mut self) -> Result<bool, YamlError> {
        loop {
            match self.tokens.front().map(|token| token.status) {
                Some(TokenStatus::Confirmed) => return Ok(true),
                Some(TokenStatus::Retracted) => {
                    self.tokens.pop_front();
                    self.tokens_taken += 1;
                    continue;
                }
                Some(TokenStatus::Tentative) | None => {}
            }
            if self.ended_stream {
                return Ok(false);
            }
            if let Err(err) = self.scan_next_token() {
                self.failed = true;
                return Err(err);
            }
        }
    }

    // === The main scanning step ===

    fn scan_next_token(&mut self) -> Result<(), YamlError> {
        if self.ended_stream {
            return Ok(());
        }

        if !self.started_stream {
            self.scan_stream_start();
            return Ok(());
        }

        self.scan_to_next_token();
        self.validate_simple_keys();
        self.pop_indent_to(self.stream.column());

        let Some(c) = self.stream.peek() else {
            self.scan_stream_end();
            return Ok(());
        };
        let mark = self.stream.mark();

        // are we at a document marker?
        if mark.column == 0 {
            if exp::DOC_START.matches(&self.stream) {
                self.scan_document_indicator(TokenType::DocumentStart);
                return Ok(());
            }
            if exp::DOC_END.matches(&self.stream) {
                self.scan_document_indicator(TokenType::DocumentEnd);
                return Ok(());
            }
        }

        match c {
            '[' => {
                self.scan_flow_collection_start(TokenType::FlowSeqStart);
                return Ok(());
            }
            '{' => {
                self.scan_flow_collection_start(TokenType::FlowMapStart);
                return Ok(());
            }
            ']' => {
                self.scan_flow_collection_end(TokenType::FlowSeqEnd);
                return Ok(());
            }
            '}' => {
                self.scan_flow_collection_end(TokenType::FlowMapEnd);
                return Ok(());
            }
            ',' => {
                self.scan_flow_entry();
                return Ok(());
            }
            _ => {}
        }

        if self.is_block_entry() {
            self.scan_block_entry();
            return Ok(());
        }

        if self.is_key() {
            self.scan_key();
            return Ok(());
        }

        if self.is_value() {
            return self.scan_value();
        }

        match c {
            '&' | '*' | '!' => return Err(self.unsupported(mark, c)),
            '|' | '>' if self.flow_level == 0 => return Err(self.unsupported(mark, c)),
            '%' if mark.column == 0 => return Err(self.unsupported(mark, c)),
            '\'' | '"' => return self.scan_quoted_scalar(),
            _ => {}
        }

        if self.is_plain_scalar() {
            self.scan_plain_scalar();
            return Ok(());
        }

        Err(self.unrecognized(mark, c))
    }

    /// Eats whitespace, comments and line breaks up to the start of the next token.
    fn scan_to_next_token(&mut self) {
        loop {
            while let Some(c) = self.stream.peek() {
                if !self.is_whitespace_to_be_eaten(c) {
                    break;
                }
                self.stream.next_char();
            }

            if exp::COMMENT.matches(&self.stream) {
                while !self.stream.is_eof() && !exp::BREAK.matches(&self.stream) {
                    self.stream.next_char();
                }
            }

            let Some(len) = exp::BREAK.match_len(&self.stream) else {
                break;
            };
            self.stream.eat(len);

            self.validate_simple_keys();

            // a new line in block context may start a simple key
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
    }

    // Tabs are never eaten where block indentation could be required.
    fn is_whitespace_to_be_eaten(&self, c: char) -> bool {
        match c {
            ' ' => true,
            '\t' => self.flow_level > 0 || !self.simple_key_allowed,
            _ => false,
        }
    }

    fn is_block_entry(&self) -> bool {
        self.flow_level == 0 && self.simple_key_allowed && exp::BLOCK_ENTRY.matches(&self.stream)
    }

    fn is_key(&self) -> bool {
        if self.flow_level > 0 {
            return exp::KEY_IN_FLOW.matches(&self.stream);
        }
        self.simple_key_allowed && exp::KEY.matches(&self.stream)
    }

    fn is_value(&self) -> bool {
        if self.flow_level > 0 {
            return exp::VALUE_IN_FLOW.matches(&self.stream);
        }
        exp::VALUE.matches(&self.stream)
    }

    fn is_plain_scalar(&self) -> bool {
        if self.flow_level > 0 {
            return exp::PLAIN_SCALAR_IN_FLOW.matches(&self.stream);
        }
        exp::PLAIN_SCALAR.matches(&self.stream)
    }

    // === Token scanners ===

    fn scan_stream_start(&mut self) {
        let mark = self.stream.mark();
        if self.stream.peek() == Some('\u{feff}') {
            self.stream.next_char();
        }
        self.started_stream = true;
        self.simple_key_allowed = true;
        self.enqueue(Token::new(TokenType::StreamStart, mark));
    }

    fn scan_stream_end(&mut self) {
        self.retract_all_simple_keys();
        self.unroll_indents();
        self.simple_key_allowed = false;
        self.ended_stream = true;
        let mark = self.stream.mark();
        self.enqueue(Token::new(TokenType::StreamEnd, mark));
    }

    fn scan_document_indicator(&mut self, ttype: TokenType) {
        self.retract_all_simple_keys();
        self.unroll_indents();
        self.simple_key_allowed = false;
        let mark = self.stream.mark();
        self.stream.eat(3);
        log::debug!("{ttype} at {mark}");
        self.enqueue(Token::new(ttype, mark));
    }

    fn scan_flow_collection_start(&mut self, ttype: TokenType) {
        // the collection itself may be a simple key
        self.save_simple_key();
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let mark = self.stream.mark();
        self.stream.next_char();
        self.enqueue(Token::new(ttype, mark));
    }

    fn scan_flow_collection_end(&mut self, ttype: TokenType) {
        self.remove_simple_key();
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let mark = self.stream.mark();
        self.stream.next_char();
        self.enqueue(Token::new(ttype, mark));
    }

    fn scan_flow_entry(&mut self) {
        self.remove_simple_key();
        self.simple_key_allowed = true;
        let mark = self.stream.mark();
        self.stream.next_char();
        self.enqueue(Token::new(TokenType::FlowEntry, mark));
    }

    fn scan_block_entry(&mut self) {
        let mark = self.stream.mark();
        self.push_indent_to(mark.column, IndentKind::Sequence);
        self.remove_simple_key();
        self.simple_key_allowed = true;
        self.stream.next_char();
        self.enqueue(Token::new(TokenType::BlockEntry, mark));
    }

    fn scan_key(&mut self) {
        let mark = self.stream.mark();
        self.push_indent_to(mark.column, IndentKind::Mapping);
        self.remove_simple_key();
        self.simple_key_allowed = self.flow_level == 0;
        self.stream.next_char();
        self.enqueue(Token::new(TokenType::Key, mark));
    }

    fn scan_value(&mut self) -> Result<(), YamlError> {
        let mark = self.stream.mark();
        if let Some(key) = self.simple_keys[self.flow_level].take() {
            self.confirm(key);
            // no second implicit key until the next line
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(self.unrecognized(mark, ':'));
                }
                self.push_indent_to(mark.column, IndentKind::Mapping);
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        self.stream.next_char();
        self.enqueue(Token::new(TokenType::Value, mark));
        Ok(())
    }

    fn scan_plain_scalar(&mut self) {
        // the block indentation in force around the scalar, not the one its key would open
        let indent = self.indents.last().copied();
        self.save_simple_key();
        let mark = self.stream.mark();

        let mut value = String::new();
        let mut whitespace = String::new();
        let mut leading_break = false;
        let mut trailing_breaks = 0;

        loop {
            if self.stream.column() == 0
                && (exp::DOC_START.matches(&self.stream) || exp::DOC_END.matches(&self.stream))
            {
                break;
            }
            if exp::COMMENT.matches(&self.stream) {
                break;
            }

            while let Some(c) = self.stream.peek() {
                if exp::BLANK.matches(&self.stream)
                    || exp::BREAK.matches(&self.stream)
                    || self.ends_plain_scalar()
                {
                    break;
                }
                if leading_break {
                    if trailing_breaks == 0 {
                        value.push(' ');
                    } else {
                        value.extend(std::iter::repeat('\n').take(trailing_breaks));
                    }
                    leading_break = false;
                    trailing_breaks = 0;
                } else {
                    value.push_str(&whitespace);
                }
                whitespace.clear();
                value.push(c);
                self.stream.next_char();
            }

            if !exp::BLANK.matches(&self.stream) && !exp::BREAK.matches(&self.stream) {
                break;
            }

            loop {
                if exp::BLANK.matches(&self.stream) {
                    if let Some(c) = self.stream.next_char() {
                        if !leading_break {
                            whitespace.push(c);
                        }
                    }
                } else if let Some(len) = exp::BREAK.match_len(&self.stream) {
                    self.stream.eat(len);
                    if leading_break {
                        trailing_breaks += 1;
                    } else {
                        whitespace.clear();
                        leading_break = true;
                    }
                } else {
                    break;
                }
            }

            // a continuation line must be indented deeper than the enclosing block
            if self.flow_level == 0
                && leading_break
                && indent.is_some_and(|indent| self.stream.column() <= indent)
            {
                break;
            }
        }

        self.simple_key_allowed = leading_break;
        self.enqueue(Token::new(TokenType::PlainScalar(value), mark));
    }

    fn ends_plain_scalar(&self) -> bool {
        if self.flow_level > 0 {
            exp::VALUE_IN_FLOW.matches(&self.stream) || exp::FLOW_INDICATOR.matches(&self.stream)
        } else {
            exp::VALUE.matches(&self.stream)
        }
    }

    fn scan_quoted_scalar(&mut self) -> Result<(), YamlError> {
        self.save_simple_key();
        let mark = self.stream.mark();
        let single = self.stream.next_char() == Some('\'');
        let value = self.read_quoted_scalar(single, mark)?;
        self.simple_key_allowed = false;
        self.enqueue(Token::new(TokenType::QuotedScalar(value), mark));
        Ok(())
    }

    // Reads up to and including the closing quote; the opening quote is already consumed.
    fn read_quoted_scalar(&mut self, single: bool, start: Mark) -> Result<String, YamlError> {
        let quote = if single { '\'' } else { '"' };
        let mut value = String::new();

        loop {
            if self.stream.is_eof()
                || (self.stream.column() == 0
                    && (exp::DOC_START.matches(&self.stream)
                        || exp::DOC_END.matches(&self.stream)))
            {
                return Err(self.unterminated(start));
            }

            let mut escaped_break = false;
            while let Some(c) = self.stream.peek() {
                if exp::BLANK.matches(&self.stream) || exp::BREAK.matches(&self.stream) {
                    break;
                }
                if single && c == '\'' && self.stream.peek_nth(1) == Some('\'') {
                    value.push('\'');
                    self.stream.eat(2);
                } else if c == quote {
                    break;
                } else if !single && c == '\\' {
                    let escape_mark = self.stream.mark();
                    self.stream.next_char();
                    if let Some(len) = exp::BREAK.match_len(&self.stream) {
                        self.stream.eat(len);
                        escaped_break = true;
                        break;
                    }
                    let escaped = self.read_escape(escape_mark)?;
                    value.push(escaped);
                } else {
                    value.push(c);
                    self.stream.next_char();
                }
            }

            if self.stream.peek() == Some(quote) {
                self.stream.next_char();
                return Ok(value);
            }

            let mut whitespace = String::new();
            let mut leading_break = false;
            let mut trailing_breaks = 0;
            loop {
                if exp::BLANK.matches(&self.stream) {
                    if let Some(c) = self.stream.next_char() {
                        if !leading_break && !escaped_break {
                            whitespace.push(c);
                        }
                    }
                } else if let Some(len) = exp::BREAK.match_len(&self.stream) {
                    self.stream.eat(len);
                    if leading_break || escaped_break {
                        trailing_breaks += 1;
                    } else {
                        leading_break = true;
                    }
                } else {
                    break;
                }
            }

            if leading_break && trailing_breaks == 0 {
                value.push(' ');
            } else if leading_break || escaped_break {
                value.extend(std::iter::repeat('\n').take(trailing_breaks));
            } else {
                value.push_str(&whitespace);
            }
        }
    }

    // Decodes the escape after a backslash in a double-quoted scalar.
    fn read_escape(&mut self, mark: Mark) -> Result<char, YamlError> {
        let Some(c) = self.stream.next_char() else {
            return Err(self.unterminated(mark));
        };
        let escaped = match c {
            '0' => '\0',
            'a' => '\x07',
            'b' => '\x08',
            't' | '\t' => '\t',
            'n' => '\n',
            'v' => '\x0b',
            'f' => '\x0c',
            'r' => '\r',
            'e' => '\x1b',
            ' ' => ' ',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            'N' => '\u{85}',
            '_' => '\u{a0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            'x' => return self.read_hex_escape(mark, c, 2),
            'u' => return self.read_hex_escape(mark, c, 4),
            'U' => return self.read_hex_escape(mark, c, 8),
            other => return Err(self.invalid_escape(mark, other.to_string())),
        };
        Ok(escaped)
    }

    fn read_hex_escape(&mut self, mark: Mark, prefix: char, digits: usize) -> Result<char, YamlError> {
        let hex = self.stream.take(digits);
        Some(&hex)
            .filter(|hex| hex.len() == digits && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32)
            .ok_or_else(|| self.invalid_escape(mark, format!("{prefix}{hex}")))
    }

    // === Simple keys ===

    /// Records a simple-key candidate at the current position, queueing its tentative tokens.
    fn save_simple_key(&mut self) {
        if !self.simple_key_allowed {
            return;
        }
        self.remove_simple_key();

        let mark = self.stream.mark();
        let map_start_token = self.push_indent_to(mark.column, IndentKind::Mapping);
        let indent_height = map_start_token.map(|number| {
            self.set_status(number, TokenStatus::Tentative);
            self.indents.len()
        });
        let key_token = self.enqueue(Token::tentative(TokenType::Key, mark));

        self.simple_keys[self.flow_level] = Some(SimpleKey {
            mark,
            key_token,
            map_start_token,
            indent_height,
        });
    }

    /// Retracts every candidate whose lookahead window has closed: the scanner has moved to
    /// another line, or too far past the candidate's start.
    fn validate_simple_keys(&mut self) {
        let current = self.stream.mark();
        for level in 0..self.simple_keys.len() {
            let stale = self.simple_keys[level].as_ref().is_some_and(|key| {
                key.mark.line != current.line
                    || current.index - key.mark.index > MAX_SIMPLE_KEY_LENGTH
            });
            if stale {
                if let Some(key) = self.simple_keys[level].take() {
                    self.retract(key);
                }
            }
        }
    }

    fn remove_simple_key(&mut self) {
        if let Some(key) = self.simple_keys[self.flow_level].take() {
            self.retract(key);
        }
    }

    fn retract_all_simple_keys(&mut self) {
        for level in 0..self.simple_keys.len() {
            if let Some(key) = self.simple_keys[level].take() {
                self.retract(key);
            }
        }
    }

    fn confirm(&mut self, key: SimpleKey) {
        log::debug!("confirmed simple key at {}", key.mark);
        self.set_status(key.key_token, TokenStatus::Confirmed);
        if let Some(number) = key.map_start_token {
            self.set_status(number, TokenStatus::Confirmed);
        }
    }

    fn retract(&mut self, key: SimpleKey) {
        log::debug!("retracted simple key at {}", key.mark);
        self.set_status(key.key_token, TokenStatus::Retracted);
        if let Some(number) = key.map_start_token {
            self.set_status(number, TokenStatus::Retracted);
        }
        // the tentative level goes away without a BlockEnd
        if let Some(height) = key.indent_height {
            if height > 0 && height <= self.indents.len() {
                self.indents.remove(height - 1);
            }
        }
    }

    // === Indentation & flow ===

    /// Opens a block collection at `column` if it is deeper than the current indentation.
    /// Returns the number of the queued start token.
    fn push_indent_to(&mut self, column: usize, kind: IndentKind) -> Option<usize> {
        if self.flow_level > 0 {
            return None;
        }
        if self.indents.last().is_some_and(|&top| column <= top) {
            return None;
        }

        self.indents.push(column);
        let ttype = match kind {
            IndentKind::Sequence => TokenType::BlockSeqStart,
            IndentKind::Mapping => TokenType::BlockMapStart,
        };
        let mark = self.stream.mark();
        Some(self.enqueue(Token::new(ttype, mark)))
    }

    /// Closes every block collection indented deeper than `column`.
    fn pop_indent_to(&mut self, column: usize) {
        if self.flow_level > 0 {
            return;
        }
        while self.indents.last().is_some_and(|&top| top > column) {
            self.indents.pop();
            let mark = self.stream.mark();
            self.enqueue(Token::new(TokenType::BlockEnd, mark));
        }
    }

    // Closes all open block collections, flow or not.
    fn unroll_indents(&mut self) {
        while self.indents.pop().is_some() {
            let mark = self.stream.mark();
            self.enqueue(Token::new(TokenType::BlockEnd, mark));
        }
    }

    fn increase_flow_level(&mut self) {
        self.flow_level += 1;
        self.simple_keys.push(None);
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            if let Some(Some(key)) = self.simple_keys.pop() {
                self.retract(key);
            }
        }
    }

    // === Queue helpers ===

    fn enqueue(&mut self, token: Token) -> usize {
        let number = self.tokens_taken + self.tokens.len();
        log::trace!("queued #{number} {token}");
        self.tokens.push_back(token);
        number
    }

    fn set_status(&mut self, number: usize, status: TokenStatus) {
        let token = number
            .checked_sub(self.tokens_taken)
            .and_then(|index| self.tokens.get_mut(index));
        if let Some(token) = token {
            token.status = status;
        }
    }

    // === Diagnostics ===

    pub(crate) fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.input.to_string())
    }

    pub(crate) fn span_at(&self, mark: Mark) -> SourceSpan {
        let len = self
            .input
            .get(mark.index..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        (mark.index, len).into()
    }

    /// Position and description of the next token, for structural error reports.
    pub(crate) fn next_token_summary(&mut self) -> Result<(Mark, String), YamlError> {
        let end = self.stream.mark();
        Ok(match self.peek_next_token()? {
            Some(token) => (token.mark, token.ttype.to_string()),
            None => (end, "end of stream".to_string()),
        })
    }

    fn unrecognized(&self, mark: Mark, found: char) -> YamlError {
        ScannerError::UnrecognizedToken {
            src: self.named_source(),
            span: self.span_at(mark),
            mark,
            found,
        }
        .into()
    }

    fn unsupported(&self, mark: Mark, indicator: char) -> YamlError {
        ScannerError::UnsupportedIndicator {
            src: self.named_source(),
            span: self.span_at(mark),
            mark,
            indicator,
        }
        .into()
    }

    fn unterminated(&self, mark: Mark) -> YamlError {
        ScannerError::UnterminatedScalar {
            src: self.named_source(),
            span: self.span_at(mark),
            mark,
        }
        .into()
    }

    fn invalid_escape(&self, mark: Mark, escape: String) -> YamlError {
        ScannerError::InvalidEscape {
            src: self.named_source(),
            span: self.span_at(mark),
            mark,
            escape,
        }
        .into()
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, YamlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.get_next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType::*;

    fn scan(input: &str) -> Vec<TokenType> {
        let mut scanner = Scanner::new(input);
        match scanner.tokenize() {
            Ok(tokens) => tokens.into_iter().map(|t| t.ttype).collect(),
            Err(err) => panic!("{:?}", miette::Report::new(err)),
        }
    }

    fn plain(s: &str) -> TokenType {
        PlainScalar(s.to_string())
    }

    fn quoted(s: &str) -> TokenType {
        QuotedScalar(s.to_string())
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(scan(""), vec![StreamStart, StreamEnd]);
        assert_eq!(scan("  # only a comment\n\n"), vec![StreamStart, StreamEnd]);
    }

    #[test]
    fn test_flow_sequence_tokens() {
        assert_eq!(
            scan("[1,2]"),
            vec![
                StreamStart,
                FlowSeqStart,
                plain("1"),
                FlowEntry,
                plain("2"),
                FlowSeqEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_block_mapping_tokens() {
        assert_eq!(
            scan("a: 1\nb: 2\n"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                plain("a"),
                Value,
                plain("1"),
                Key,
                plain("b"),
                Value,
                plain("2"),
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_nested_block_mapping_tokens() {
        assert_eq!(
            scan("a:\n  b: 1\nc: 2"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                plain("a"),
                Value,
                BlockMapStart,
                Key,
                plain("b"),
                Value,
                plain("1"),
                BlockEnd,
                Key,
                plain("c"),
                Value,
                plain("2"),
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_block_sequence_tokens() {
        assert_eq!(
            scan("- a\n- b\n"),
            vec![
                StreamStart,
                BlockSeqStart,
                BlockEntry,
                plain("a"),
                BlockEntry,
                plain("b"),
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_sequence_of_mappings_tokens() {
        assert_eq!(
            scan("- a: 1\n  b: 2\n- c: 3\n"),
            vec![
                StreamStart,
                BlockSeqStart,
                BlockEntry,
                BlockMapStart,
                Key,
                plain("a"),
                Value,
                plain("1"),
                Key,
                plain("b"),
                Value,
                plain("2"),
                BlockEnd,
                BlockEntry,
                BlockMapStart,
                Key,
                plain("c"),
                Value,
                plain("3"),
                BlockEnd,
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_flow_mapping_tokens() {
        assert_eq!(
            scan("{a: 1, b: 2}"),
            vec![
                StreamStart,
                FlowMapStart,
                Key,
                plain("a"),
                Value,
                plain("1"),
                FlowEntry,
                Key,
                plain("b"),
                Value,
                plain("2"),
                FlowMapEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_explicit_key() {
        assert_eq!(
            scan("? a\n: b\n"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                plain("a"),
                Value,
                plain("b"),
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_document_markers() {
        assert_eq!(
            scan("---\na: 1\n...\n--- b\n"),
            vec![
                StreamStart,
                DocumentStart,
                BlockMapStart,
                Key,
                plain("a"),
                Value,
                plain("1"),
                BlockEnd,
                DocumentEnd,
                DocumentStart,
                plain("b"),
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_plain_scalar_stops_at_comment() {
        assert_eq!(
            scan("key: some value  # trailing\n"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                plain("key"),
                Value,
                plain("some value"),
                BlockEnd,
                StreamEnd
            ]
        );
        assert_eq!(scan("a#b"), vec![StreamStart, plain("a#b"), StreamEnd]);
    }

    #[test]
    fn test_multi_line_plain_scalar() {
        assert_eq!(
            scan("key: first\n  second\n\n  third\nnext: x"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                plain("key"),
                Value,
                plain("first second\nthird"),
                Key,
                plain("next"),
                Value,
                plain("x"),
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_quoted_scalars() {
        assert_eq!(
            scan(r#"['it''s', "tab\there", "\u00e9\x41"]"#),
            vec![
                StreamStart,
                FlowSeqStart,
                quoted("it's"),
                FlowEntry,
                quoted("tab\there"),
                FlowEntry,
                quoted("éA"),
                FlowSeqEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_quoted_scalar_folding() {
        assert_eq!(
            scan("'one\n  two\n\n  three '"),
            vec![StreamStart, quoted("one two\nthree "), StreamEnd]
        );
        assert_eq!(
            scan("\"joined\\\n   line\""),
            vec![StreamStart, quoted("joinedline"), StreamEnd]
        );
    }

    #[test]
    fn test_quoted_key() {
        assert_eq!(
            scan("\"a b\": c"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                quoted("a b"),
                Value,
                plain("c"),
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_flow_collection_as_value() {
        assert_eq!(
            scan("a: [x, y]\nb: {c: d}\n"),
            vec![
                StreamStart,
                BlockMapStart,
                Key,
                plain("a"),
                Value,
                FlowSeqStart,
                plain("x"),
                FlowEntry,
                plain("y"),
                FlowSeqEnd,
                Key,
                plain("b"),
                Value,
                FlowMapStart,
                Key,
                plain("c"),
                Value,
                plain("d"),
                FlowMapEnd,
                BlockEnd,
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_flow_level_tracking() {
        let mut scanner = Scanner::new("[[a], {b: c}]");
        scanner.tokenize().unwrap();
        assert_eq!(scanner.flow_level(), 0);
        assert!(scanner.is_stream_ended());

        let mut unclosed = Scanner::new("[[a]");
        let tokens = unclosed.tokenize().unwrap();
        assert_eq!(unclosed.flow_level(), 1);
        assert_eq!(tokens.last().map(|t| t.ttype.clone()), Some(StreamEnd));
    }

    #[test]
    fn test_indentation_balance() {
        let inputs = [
            "a: 1\nb:\n  c:\n    - d\n    - e: f\n",
            "- - - x\n",
            "a:\n- 1\n- 2\nb: [1, {c: d}]\n",
            "---\nx: 1\n---\n- y\n",
            "key: [a,\n  b]\n",
        ];
        for input in inputs {
            let tokens = scan(input);
            let starts = tokens
                .iter()
                .filter(|t| matches!(t, BlockSeqStart | BlockMapStart))
                .count();
            let ends = tokens.iter().filter(|t| matches!(t, BlockEnd)).count();
            assert_eq!(starts, ends, "unbalanced indentation for {input:?}: {tokens:?}");
        }
    }

    #[test]
    fn test_tentative_tokens_never_delivered() {
        let mut scanner = Scanner::new("a: [1, 2]\n- b\n");
        for token in scanner.by_ref() {
            match token {
                Ok(token) => assert_eq!(token.status, TokenStatus::Confirmed),
                Err(_) => break,
            }
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut scanner = Scanner::new("x");
        assert!(scanner.check(StreamStart).unwrap());
        assert_eq!(
            scanner.peek_next_token().unwrap().map(|t| t.ttype.clone()),
            Some(StreamStart)
        );
        scanner.pop_next_token().unwrap();
        let token = scanner.get_next_token().unwrap().unwrap();
        assert_eq!(token.ttype, plain("x"));
        assert_eq!(token.mark, Mark { index: 0, line: 0, column: 0 });
        assert!(scanner.check(StreamEnd).unwrap());
        scanner.pop_next_token().unwrap();
        assert!(scanner.get_next_token().unwrap().is_none());
        assert!(scanner.peek_next_token().unwrap().is_none());
    }

    #[test]
    fn test_unrecognized_token() {
        let mut scanner = Scanner::new("a: b\n@oops");
        let err = scanner.tokenize().unwrap_err();
        match err {
            YamlError::Scanner(ScannerError::UnrecognizedToken { mark, found, .. }) => {
                assert_eq!(found, '@');
                assert_eq!((mark.line, mark.column), (1, 0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_diagnostic_names_its_source() {
        let err = Scanner::new_with_name("a: b\n@oops", "conf.yaml".to_string())
            .tokenize()
            .unwrap_err();
        let report = format!("{:?}", miette::Report::new(err));
        assert!(report.contains("conf.yaml"), "{report}");
        assert!(report.contains("@oops"), "{report}");
    }

    #[test]
    fn test_one_implicit_key_per_line() {
        for (input, column) in [("a: b: c", 4), ("- k: v: w", 6), ("--- a: 1", 5)] {
            let err = Scanner::new(input).tokenize().unwrap_err();
            match err {
                YamlError::Scanner(ScannerError::UnrecognizedToken { mark, found, .. }) => {
                    assert_eq!(found, ':', "for {input:?}");
                    assert_eq!((mark.line, mark.column), (0, column), "for {input:?}");
                }
                other => panic!("unexpected error for {input:?}: {other:?}"),
            }
        }

        // a new line reopens the slot
        assert_eq!(scan("a: b\nc: d").iter().filter(|t| **t == Key).count(), 2);
    }

    #[test]
    fn test_unsupported_indicators() {
        for input in ["a: &x 1", "a: *x", "a: !tag b", "a: |\n  text", "%YAML 1.2\n---"] {
            let mut scanner = Scanner::new(input);
            let err = scanner.tokenize().unwrap_err();
            assert!(
                matches!(err, YamlError::Scanner(ScannerError::UnsupportedIndicator { .. })),
                "expected unsupported indicator for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_unterminated_and_invalid_escape() {
        let err = Scanner::new("a: 'open").tokenize().unwrap_err();
        assert!(matches!(
            err,
            YamlError::Scanner(ScannerError::UnterminatedScalar { .. })
        ));

        let err = Scanner::new(r#"a: "\q""#).tokenize().unwrap_err();
        match err {
            YamlError::Scanner(ScannerError::InvalidEscape { escape, .. }) => assert_eq!(escape, "q"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let scanner = Scanner::new("a: b\n@");
        let results: Vec<_> = scanner.collect();
        assert!(results.last().is_some_and(|r| r.is_err()));
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_tab_not_eaten_as_indentation() {
        let err = Scanner::new("a:\n\tb: 1").tokenize().unwrap_err();
        assert!(matches!(
            err,
            YamlError::Scanner(ScannerError::UnrecognizedToken { found: '\t', .. })
        ));
        assert_eq!(
            scan("[a,\tb]"),
            vec![
                StreamStart,
                FlowSeqStart,
                plain("a"),
                FlowEntry,
                plain("b"),
                FlowSeqEnd,
                StreamEnd
            ]
        );
    }
}
