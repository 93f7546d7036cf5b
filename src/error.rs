//! Error types shared by the grammar compiler and the chat normalizer.
use serde_json::Value;
use thiserror::Error;

/// A schema node that the grammar compiler cannot translate.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Not a union, constant, enumeration, object-with-properties,
    /// array-with-items, or known primitive type.
    #[error("unrecognized schema: {node}")]
    UnsupportedNode { node: Value },
}

impl SchemaError {
    /// The offending schema node, for diagnostics.
    pub fn node(&self) -> &Value {
        match self {
            SchemaError::UnsupportedNode { node } => node,
        }
    }
}

/// A chat message that cannot be flattened to a single string.
#[derive(Debug, Error, PartialEq)]
pub enum ChatError {
    #[error("message {index}: missing 'content'")]
    MissingContent { index: usize },

    #[error("message {index}: invalid 'content' type (expected string or array of parts, found {found})")]
    InvalidContentType { index: usize, found: &'static str },

    /// The message list itself is not well-formed JSON of the expected shape.
    #[error("malformed chat messages: {0}")]
    Decode(String),
}

/// Human name of a JSON value's kind, used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
