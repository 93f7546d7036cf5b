// Fixed GBNF productions for the JSON primitive types.
//
// Downstream grammar consumers depend on these byte-for-byte; do not reformat.

/// Optional whitespace between tokens. Always the first rule of a grammar.
pub const SPACE_RULE: &str = r#"" "?"#;

const BOOLEAN_RULE: &str = r#"("true" | "false") space"#;
const NUMBER_RULE: &str = r#"("-"? ([0-9] | [1-9][0-9]*)) ("." [0-9]+)? ([eE][-+]?[0-9]+)? space"#;
const INTEGER_RULE: &str = r#"("-"? ([0-9] | [1-9][0-9]*)) space"#;
const STRING_RULE: &str = r#""\"" ( [^"\\] | "\\" (["\\/bfnrt] | "u" [0-9a-fA-F]{4}) )* "\"" space"#;
const NULL_RULE: &str = r#""null" space"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Number,
    Integer,
    String,
    Null,
}

impl Primitive {
    pub const ALL: [Primitive; 5] = [
        Primitive::Boolean,
        Primitive::Number,
        Primitive::Integer,
        Primitive::String,
        Primitive::Null,
    ];

    /// Maps a JSON Schema `type` keyword to a primitive, if it is one.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Primitive::Boolean),
            "number" => Some(Primitive::Number),
            "integer" => Some(Primitive::Integer),
            "string" => Some(Primitive::String),
            "null" => Some(Primitive::Null),
            _ => None,
        }
    }

    /// The `type` keyword, which doubles as the shared rule name.
    pub fn type_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Number => "number",
            Primitive::Integer => "integer",
            Primitive::String => "string",
            Primitive::Null => "null",
        }
    }

    pub fn production(self) -> &'static str {
        match self {
            Primitive::Boolean => BOOLEAN_RULE,
            Primitive::Number => NUMBER_RULE,
            Primitive::Integer => INTEGER_RULE,
            Primitive::String => STRING_RULE,
            Primitive::Null => NULL_RULE,
        }
    }
}
