//! Compile JSON Schema into GBNF grammars for constrained LLM sampling, and
//! flatten chat messages for the native chat formatter.
//!
//! ```
//! let schema = serde_json::json!({"type": "array", "items": {"type": "string"}});
//! let grammar = json_gbnf::compile(&schema, None).unwrap();
//! assert!(grammar.starts_with("space ::= "));
//! assert!(grammar.contains("\nroot ::= \"[\" space (string"));
//! ```
pub mod chat;
pub mod cli;
pub mod error;
pub mod grammar;
pub mod jq_exec;
pub mod path_de;
pub mod schema;

pub use chat::{ChatMessage, ContentPart, FormattedChatMessage, MessageContent, normalize};
pub use error::{ChatError, SchemaError};
pub use grammar::{Grammar, PropOrder, SchemaGrammarConverter, compile, compile_grammar};
pub use schema::SchemaNode;
