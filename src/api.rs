use crate::error::YamlError;
use crate::parser::{Document, Parser};
use crate::serialization::{to_value, Value};
use serde::{Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Parses the first document of `source`. An empty stream gives a document with a null root.
///
/// # Errors
/// Returns the first scanner or parser error.
pub fn load(source: &str) -> Result<Document, YamlError> {
    Ok(Parser::new(source).next_document()?.unwrap_or_default())
}

/// Parses every document of `source`.
///
/// # Errors
/// Returns the first scanner or parser error; no documents are returned in that case.
pub fn load_all(source: &str) -> Result<Vec<Document>, YamlError> {
    Parser::new(source).collect()
}

/// Reads a file and parses every document in it. Diagnostics carry the file's path as the
/// source name.
///
/// # Errors
/// Returns `YamlError::Io` if the file cannot be read, otherwise the first parse error.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Document>, YamlError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| YamlError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    log::debug!("loaded {} bytes from {}", text.len(), path.display());
    let parser = Parser::new_with_name(&text, path.display().to_string());
    parser.collect()
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.root.serialize(serializer)
    }
}

impl Document {
    /// The document's data as a generic, serializable `Value`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        to_value(&self.root)
    }

    /// Serializes the document into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails, e.g. for a mapping key that is not
    /// a scalar.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the document into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}
