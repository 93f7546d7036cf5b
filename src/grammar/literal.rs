use serde_json::Value;

/// Quote `literal` as a GBNF string literal.
///
/// Only carriage return, newline and double quote are escaped. Inputs are
/// normally JSON text already, so anything else is passed through unchanged.
pub fn format_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 2);
    out.push('"');
    for c in literal.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Literal matching the JSON encoding of `value` (used for `const`, `enum`
/// members and property names).
pub fn constant_literal(value: &Value) -> String {
    format_literal(&value.to_string())
}
