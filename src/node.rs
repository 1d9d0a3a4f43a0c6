use crate::error::{ParserError, YamlError};
use crate::map::Map;
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::scanner::Scanner;
use crate::stream::Mark;
use crate::token::TokenType;
use std::fmt;

/// The value a node holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeContent {
    /// Never instantiated: the input had nothing where this node was expected.
    #[default]
    Null,
    Scalar(String),
    Sequence(Sequence),
    Map(Map),
}

/// A parsed value and where it started.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub content: NodeContent,
    pub mark: Mark,
}

// What the next token makes of the node about to be parsed.
#[derive(Debug, Clone, Copy)]
enum Start {
    Map,
    Sequence,
    IndentlessSequence,
    Scalar,
    Nothing,
}

impl Start {
    // `- ` only opens an indentless sequence as the value of a block mapping entry. Anywhere
    // else it belongs to the enclosing sequence, and the node being parsed is empty.
    fn of(ttype: &TokenType, block_value: bool) -> Start {
        match ttype {
            TokenType::BlockMapStart | TokenType::FlowMapStart => Start::Map,
            TokenType::BlockSeqStart | TokenType::FlowSeqStart => Start::Sequence,
            TokenType::BlockEntry if block_value => Start::IndentlessSequence,
            TokenType::BlockEntry => Start::Nothing,
            TokenType::PlainScalar(_) | TokenType::QuotedScalar(_) => Start::Scalar,
            TokenType::StreamStart
            | TokenType::StreamEnd
            | TokenType::DocumentStart
            | TokenType::DocumentEnd
            | TokenType::BlockEnd
            | TokenType::Key
            | TokenType::Value
            | TokenType::FlowSeqEnd
            | TokenType::FlowMapEnd
            | TokenType::FlowEntry => Start::Nothing,
        }
    }
}

impl Node {
    pub fn new(content: NodeContent) -> Self {
        Node {
            content,
            mark: Mark::default(),
        }
    }

    /// Parses one node starting at the next token.
    ///
    /// Tokens that cannot begin a node are left in place and the node stays `Null`. Collections
    /// are attached to the node before their contents are parsed, so whatever was built stays
    /// owned by the node when parsing fails halfway.
    pub fn parse(&mut self, scanner: &mut Scanner<'_>) -> Result<(), YamlError> {
        self.parse_nested(scanner, Depth::new(DEFAULT_MAX_DEPTH))
    }

    pub(crate) fn parse_nested(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
    ) -> Result<(), YamlError> {
        self.parse_with(scanner, depth, false)
    }

    /// Parses the value of a block mapping entry, which may be an indentless sequence.
    pub(crate) fn parse_block_value(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
    ) -> Result<(), YamlError> {
        self.parse_with(scanner, depth, true)
    }

    fn parse_with(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
        block_value: bool,
    ) -> Result<(), YamlError> {
        let (mark, start) = match scanner.peek_next_token()? {
            Some(token) => (token.mark, Start::of(&token.ttype, block_value)),
            None => return Ok(()),
        };
        self.mark = mark;

        match start {
            Start::Map => {
                let depth = depth.enter(scanner, mark)?;
                if let NodeContent::Map(map) = self.attach(NodeContent::Map(Map::new())) {
                    map.parse_nested(scanner, depth)?;
                }
            }
            Start::Sequence => {
                let depth = depth.enter(scanner, mark)?;
                if let NodeContent::Sequence(seq) = self.attach(NodeContent::Sequence(Sequence::new())) {
                    seq.parse_nested(scanner, depth)?;
                }
            }
            Start::IndentlessSequence => {
                let depth = depth.enter(scanner, mark)?;
                if let NodeContent::Sequence(seq) = self.attach(NodeContent::Sequence(Sequence::new())) {
                    seq.parse_indentless(scanner, depth)?;
                }
            }
            Start::Scalar => {
                if let Some(token) = scanner.get_next_token()? {
                    if let TokenType::PlainScalar(text) | TokenType::QuotedScalar(text) = token.ttype {
                        self.content = NodeContent::Scalar(text);
                    }
                }
            }
            Start::Nothing => {}
        }
        Ok(())
    }

    fn attach(&mut self, content: NodeContent) -> &mut NodeContent {
        self.content = content;
        &mut self.content
    }

    pub fn is_null(&self) -> bool {
        matches!(self.content, NodeContent::Null)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match &self.content {
            NodeContent::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match &self.content {
            NodeContent::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a mapping value by its scalar key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Number of children: entries of a map, items of a sequence, zero otherwise.
    pub fn len(&self) -> usize {
        match &self.content {
            NodeContent::Sequence(seq) => seq.len(),
            NodeContent::Map(map) => map.len(),
            NodeContent::Null | NodeContent::Scalar(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes an indented outline of the node, one line per scalar or structural marker.
    pub fn write(&self, out: &mut impl fmt::Write, indent: usize) -> fmt::Result {
        match &self.content {
            NodeContent::Null => writeln!(out, "{}~", pad(indent)),
            NodeContent::Scalar(text) => writeln!(out, "{}{}", pad(indent), text),
            NodeContent::Sequence(seq) => seq.write(out, indent),
            NodeContent::Map(map) => map.write(out, indent),
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::new(NodeContent::Scalar(text.to_string()))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

pub(crate) fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

/// Remaining nesting budget while descending into collections.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth {
    limit: usize,
    left: usize,
}

impl Depth {
    pub(crate) fn new(limit: usize) -> Self {
        Depth { limit, left: limit }
    }

    // Spends one level for a collection starting at `mark`.
    fn enter(self, scanner: &Scanner<'_>, mark: Mark) -> Result<Depth, YamlError> {
        match self.left.checked_sub(1) {
            Some(left) => Ok(Depth { left, ..self }),
            None => {
                log::debug!("nesting limit of {} reached at {mark}", self.limit);
                Err(ParserError::depth_limit_exceeded(scanner, mark, self.limit).into())
            }
        }
    }
}

/// An ordered list of nodes, from a block (`- `) or flow (`[...]`) sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    items: Vec<Node>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    pub fn push(&mut self, node: Node) {
        self.items.push(node);
    }

    /// Parses a sequence whose start token is next in the stream.
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
            TokenType::BlockSeqStart => self.parse_block(scanner, depth),
            TokenType::FlowSeqStart => self.parse_flow(scanner, depth),
            other => {
                Err(ParserError::malformed_sequence(scanner, token.mark, other.to_string()).into())
            }
        }
    }

    fn parse_block(&mut self, scanner: &mut Scanner<'_>, depth: Depth) -> Result<(), YamlError> {
        loop {
            let is_end = match scanner.peek_next_token()?.map(|token| &token.ttype) {
                Some(TokenType::BlockEntry) => false,
                Some(TokenType::BlockEnd) => true,
                _ => return Err(self.malformed(scanner)?),
            };
            scanner.pop_next_token()?;
            if is_end {
                return Ok(());
            }

            // an entry directly followed by another entry or the block's end is null
            let item = self.push_placeholder();
            item.parse_nested(scanner, depth)?;
        }
    }

    /// Entries of a sequence written at the same indentation as its parent mapping key. There is
    /// no start or end token; the sequence runs for as long as entries follow.
    fn parse_indentless(
        &mut self,
        scanner: &mut Scanner<'_>,
        depth: Depth,
    ) -> Result<(), YamlError> {
        while scanner.check(TokenType::BlockEntry)? {
            scanner.pop_next_token()?;
            let item = self.push_placeholder();
            item.parse_nested(scanner, depth)?;
        }
        Ok(())
    }

    fn parse_flow(&mut self, scanner: &mut Scanner<'_>, depth: Depth) -> Result<(), YamlError> {
        loop {
            if scanner.check(TokenType::FlowSeqEnd)? {
                scanner.pop_next_token()?;
                return Ok(());
            }

            let item = self.push_placeholder();
            if scanner.check(TokenType::Key)? {
                // `[a: 1]` is a sequence holding a single-pair mapping
                if let Some(token) = scanner.peek_next_token()? {
                    item.mark = token.mark;
                }
                if let NodeContent::Map(map) = item.attach(NodeContent::Map(Map::new())) {
                    map.parse_flow_pair(scanner, depth)?;
                }
            } else {
                item.parse_nested(scanner, depth)?;
            }

            if scanner.check(TokenType::FlowEntry)? {
                scanner.pop_next_token()?;
            } else if !scanner.check(TokenType::FlowSeqEnd)? {
                return Err(self.malformed(scanner)?);
            }
        }
    }

    fn push_placeholder(&mut self) -> &mut Node {
        let index = self.items.len();
        self.items.push(Node::default());
        &mut self.items[index]
    }

    // The error for whatever token stands where an entry or the end was expected.
    fn malformed(&self, scanner: &mut Scanner<'_>) -> Result<YamlError, YamlError> {
        let (mark, found) = scanner.next_token_summary()?;
        Ok(ParserError::malformed_sequence(scanner, mark, found).into())
    }

    pub fn write(&self, out: &mut impl fmt::Write, indent: usize) -> fmt::Result {
        writeln!(out, "{}{{seq}}", pad(indent))?;
        for item in &self.items {
            item.write(out, indent + 1)?;
        }
        Ok(())
    }
}

impl<'s> IntoIterator for &'s Sequence {
    type Item = &'s Node;
    type IntoIter = std::slice::Iter<'s, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Node> for Sequence {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Sequence {
            items: iter.into_iter().collect(),
        }
    }
}
