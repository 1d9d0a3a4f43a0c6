use crate::stream::Mark;
use std::fmt;

/// Represents the different kinds of tokens that the scanner can produce.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenType {
    // == Stream & Document ==
    /// Always the first token of a stream.
    StreamStart,
    /// Always the last token of a stream.
    StreamEnd,
    /// `---` at column 0.
    DocumentStart,
    /// `...` at column 0.
    DocumentEnd,

    // == Block structure ==
    /// Opens a block sequence at a deeper indentation.
    BlockSeqStart,
    /// Opens a block mapping at a deeper indentation.
    BlockMapStart,
    /// Closes the innermost block collection.
    BlockEnd,
    /// `- ` in block context.
    BlockEntry,
    /// Starts a mapping key, explicit (`? `) or implicit (a confirmed simple key).
    Key,
    /// `:` separating a key from its value.
    Value,

    // == Flow structure ==
    /// Left Bracket: `[`
    FlowSeqStart,
    /// Right Bracket: `]`
    FlowSeqEnd,
    /// Left Brace: `{`
    FlowMapStart,
    /// Right Brace: `}`
    FlowMapEnd,
    /// Comma: `,`
    FlowEntry,

    // == Scalars ==
    /// An unquoted scalar. The associated `String` is the folded text.
    PlainScalar(String),
    /// A single- or double-quoted scalar with escapes already processed.
    QuotedScalar(String),
}

impl TokenType {
    /// Scalar text carried by the token, if any.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            TokenType::PlainScalar(s) | TokenType::QuotedScalar(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::PlainScalar(s) => write!(f, "PlainScalar({s:?})"),
            TokenType::QuotedScalar(s) => write!(f, "QuotedScalar({s:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Where a token stands in the simple-key lookahead protocol.
///
/// Tokens queued speculatively for a simple key start out `Tentative`; a later `:` turns them
/// `Confirmed`, and a closed lookahead window turns them `Retracted`. Everything else is queued
/// `Confirmed` straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Tentative,
    Confirmed,
    Retracted,
}

/// A token with its type, protocol status and starting position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ttype: TokenType,
    pub status: TokenStatus,
    pub mark: Mark,
}

impl Token {
    pub fn new(ttype: TokenType, mark: Mark) -> Token {
        Token {
            ttype,
            status: TokenStatus::Confirmed,
            mark,
        }
    }

    pub fn tentative(ttype: TokenType, mark: Mark) -> Token {
        Token {
            ttype,
            status: TokenStatus::Tentative,
            mark,
        }
    }

    pub fn is(&self, ttype: &TokenType) -> bool {
        std::mem::discriminant(&self.ttype) == std::mem::discriminant(ttype)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.ttype, self.mark)
    }
}
