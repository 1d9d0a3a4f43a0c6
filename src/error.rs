use crate::scanner::Scanner;
use crate::stream::Mark;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scanner(#[from] ScannerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error("Failed to read {path}: {message}")]
    #[diagnostic(code(yaml::io_error))]
    Io { path: String, message: String },
}

impl YamlError {
    /// Position the error was raised at. I/O failures have no position.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            YamlError::Scanner(err) => Some(err.mark()),
            YamlError::Parser(err) => Some(err.mark()),
            YamlError::Io { .. } => None,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ScannerError {
    #[error("Unrecognized token at {mark}")]
    #[diagnostic(
        code(scanner::unrecognized_token),
        help("No token can start with this character in this context.")
    )]
    UnrecognizedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("found '{found}' here")]
        span: SourceSpan,
        mark: Mark,
        found: char,
    },

    #[error("Unsupported indicator '{indicator}' at {mark}")]
    #[diagnostic(
        code(scanner::unsupported_indicator),
        help("Anchors, aliases, tags, directives and literal or folded block scalars are not supported. Quote the value if it is meant as text.")
    )]
    UnsupportedIndicator {
        #[source_code]
        src: NamedSource<String>,
        #[label("unsupported")]
        span: SourceSpan,
        mark: Mark,
        indicator: char,
    },

    #[error("Unterminated quoted scalar starting at {mark}")]
    #[diagnostic(
        code(scanner::unterminated_scalar),
        help("The input ended before the closing quote.")
    )]
    UnterminatedScalar {
        #[source_code]
        src: NamedSource<String>,
        #[label("quoted scalar starts here")]
        span: SourceSpan,
        mark: Mark,
    },

    #[error("Invalid escape sequence '\\{escape}' at {mark}")]
    #[diagnostic(
        code(scanner::invalid_escape),
        help("Double-quoted scalars accept the YAML escapes, e.g. \\n, \\t, \\\\, \\\" and \\uXXXX.")
    )]
    InvalidEscape {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid escape")]
        span: SourceSpan,
        mark: Mark,
        escape: String,
    },
}

impl ScannerError {
    pub fn mark(&self) -> Mark {
        match self {
            ScannerError::UnrecognizedToken { mark, .. }
            | ScannerError::UnsupportedIndicator { mark, .. }
            | ScannerError::UnterminatedScalar { mark, .. }
            | ScannerError::InvalidEscape { mark, .. } => *mark,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Malformed mapping at {mark}")]
    #[diagnostic(
        code(parser::malformed_mapping),
        help("A mapping entry must start with a key, and flow mapping entries are separated by ','.")
    )]
    MalformedMapping {
        #[source_code]
        src: NamedSource<String>,
        #[label("found {found} here")]
        span: SourceSpan,
        mark: Mark,
        found: String,
    },

    #[error("Malformed sequence at {mark}")]
    #[diagnostic(
        code(parser::malformed_sequence),
        help("Block sequence entries start with '- ', and flow sequence entries are separated by ','.")
    )]
    MalformedSequence {
        #[source_code]
        src: NamedSource<String>,
        #[label("found {found} here")]
        span: SourceSpan,
        mark: Mark,
        found: String,
    },

    #[error("Unexpected token at {mark}")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a token it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found {found}")]
        span: SourceSpan,
        mark: Mark,
        expected: String,
        found: String,
    },

    #[error("Nesting deeper than {limit} levels at {mark}")]
    #[diagnostic(
        code(parser::depth_limit_exceeded),
        help("Raise ParserOptions::max_depth if this document is legitimately this deep.")
    )]
    DepthLimitExceeded {
        #[source_code]
        src: NamedSource<String>,
        #[label("limit exceeded here")]
        span: SourceSpan,
        mark: Mark,
        limit: usize,
    },
}

impl ParserError {
    pub fn mark(&self) -> Mark {
        match self {
            ParserError::MalformedMapping { mark, .. }
            | ParserError::MalformedSequence { mark, .. }
            | ParserError::UnexpectedToken { mark, .. }
            | ParserError::DepthLimitExceeded { mark, .. } => *mark,
        }
    }
}

// Constructors used while parsing, where the source and span come from the scanner.
impl ParserError {
    pub(crate) fn malformed_mapping(scanner: &Scanner<'_>, mark: Mark, found: String) -> Self {
        ParserError::MalformedMapping {
            src: scanner.named_source(),
            span: scanner.span_at(mark),
            mark,
            found,
        }
    }

    pub(crate) fn malformed_sequence(scanner: &Scanner<'_>, mark: Mark, found: String) -> Self {
        ParserError::MalformedSequence {
            src: scanner.named_source(),
            span: scanner.span_at(mark),
            mark,
            found,
        }
    }

    pub(crate) fn unexpected_token(
        scanner: &Scanner<'_>,
        mark: Mark,
        expected: &str,
        found: String,
    ) -> Self {
        ParserError::UnexpectedToken {
            src: scanner.named_source(),
            span: scanner.span_at(mark),
            mark,
            expected: expected.to_string(),
            found,
        }
    }

    pub(crate) fn depth_limit_exceeded(scanner: &Scanner<'_>, mark: Mark, limit: usize) -> Self {
        ParserError::DepthLimitExceeded {
            src: scanner.named_source(),
            span: scanner.span_at(mark),
            mark,
            limit,
        }
    }
}
