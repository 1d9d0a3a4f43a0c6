use crate::error::{ParserError, YamlError};
use crate::node::{pad, Depth, Node};
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::scanner::Scanner;
use crate::token::TokenType;
use std::fmt;

/// A mapping: key/value node pairs in the order they appear in the input.
///
/// Keys are nodes, not strings, and duplicates are kept as written. Lookup by scalar key returns
/// the first match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<(Node, Node)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.iter()
            .find(|(k, _)| k.as_scalar() == Some(key))
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: Node, value: Node) {
        self.entries.push((key, value));
    }

    /// Parses a block or flow mapping whose start token is next in the stream.
    pub fn parse(&mut self, scanner: &mut Scanner<'_>) -> Result<(), YamlError> {
        self.parse_nested(scanner, Depth::new(DEFAULT_MAX_DEPTH))
    }

    pub(crate) fn parse_nested(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
    ) -> Result<(), YamlError> {
        let Some(token) = scanner.get_next_token()? else {
            return Err(self.malformed(scanner)?);
        };
        match token.ttype {
            TokenType::BlockMapStart => self.parse_block(scanner, depth),
            TokenType::FlowMapStart => self.parse_flow(scanner, depth),
            other => {
                Err(ParserError::malformed_mapping(scanner, token.mark, other.to_string()).into())
            }
        }
    }

    fn parse_block(&mut self, scanner: &mut Scanner<'_>, depth: Depth) -> Result<(), YamlError> {
        loop {
            let is_end = match scanner.peek_next_token()?.map(|token| &token.ttype) {
                Some(TokenType::Key) => false,
                Some(TokenType::BlockEnd) => true,
                _ => return Err(self.malformed(scanner)?),
            };
            scanner.pop_next_token()?;
            if is_end {
                return Ok(());
            }
            self.parse_entry(scanner, depth, true)?;
        }
    }

    fn parse_flow(&mut self, scanner: &mut Scanner<'_>, depth: Depth) -> Result<(), YamlError> {
        loop {
            if scanner.check(TokenType::FlowMapEnd)? {
                scanner.pop_next_token()?;
                return Ok(());
            }
            if !scanner.check(TokenType::Key)? {
                return Err(self.malformed(scanner)?);
            }
            scanner.pop_next_token()?;
            self.parse_entry(scanner, depth, false)?;

            if scanner.check(TokenType::FlowEntry)? {
                scanner.pop_next_token()?;
            } else if !scanner.check(TokenType::FlowMapEnd)? {
                return Err(self.malformed(scanner)?);
            }
        }
    }

    /// Parses the one-pair mapping of `[key: value]`, starting at its `Key` token. The enclosing
    /// flow sequence owns the separators.
    pub(crate) fn parse_flow_pair(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
    ) -> Result<(), YamlError> {
        scanner.pop_next_token()?;
        self.parse_entry(scanner, depth, false)
    }

    // Key node, then the value node if a `Value` token follows. The pair is stored before either
    // half is parsed.
    fn parse_entry(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
        block: bool,
    ) -> Result<(), YamlError> {
        let index = self.entries.len();
        self.entries.push((Node::default(), Node::default()));
        let (key, value) = &mut self.entries[index];

        key.parse_nested(scanner, depth)?;
        if scanner.check(TokenType::Value)? {
            scanner.pop_next_token()?;
            if block {
                value.parse_block_value(scanner, depth)?;
            } else {
                value.parse_nested(scanner, depth)?;
            }
        }
        Ok(())
    }

    fn malformed(&self, scanner: &mut Scanner<'_>) -> Result<YamlError, YamlError> {
        let (mark, found) = scanner.next_token_summary()?;
        log::debug!("malformed mapping with {} entries so far", self.entries.len());
        Ok(ParserError::malformed_mapping(scanner, mark, found).into())
    }

    pub fn write(&self, out: &mut impl fmt::Write, indent: usize) -> fmt::Result {
        writeln!(out, "{}{{map}}", pad(indent))?;
        for (key, value) in &self.entries {
            writeln!(out, "{}{{key}}", pad(indent + 1))?;
            key.write(out, indent + 2)?;
            writeln!(out, "{}{{value}}", pad(indent + 1))?;
            value.write(out, indent + 2)?;
        }
        Ok(())
    }
}

impl FromIterator<(Node, Node)> for Map {
    fn from_iter<I: IntoIterator<Item = (Node, Node)>>(iter: I) -> Self {
        Map {
            entries: iter.into_iter().collect(),
        }
    }
}
