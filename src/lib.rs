pub mod api;
pub mod error;
pub mod exp;
pub mod map;
pub mod node;
pub mod parser;
pub mod scanner;
pub mod stream;
pub mod token;
mod serialization;

pub use api::{load, load_all, load_file};
pub use error::{ParserError, ScannerError, YamlError};
pub use map::Map;
pub use node::{Node, NodeContent, Sequence};
pub use parser::{Document, Parser, ParserOptions};
pub use scanner::Scanner;
pub use serialization::Value;
pub use stream::Mark;
pub use token::{Token, TokenStatus, TokenType};
