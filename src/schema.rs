//! Tagged view over a JSON-Schema-like `serde_json::Value`.
//!
//! Input schemas are untyped trees whose kind is implied by which keys are
//! present. `SchemaNode::classify` decides the kind once, so the compiler
//! can match exhaustively instead of probing keys again.
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::grammar::primitive::Primitive;

#[derive(Debug, Clone, Copy)]
pub enum SchemaNode<'a> {
    /// `oneOf` / `anyOf`: ordered alternatives.
    Union(&'a [Value]),
    /// `const`: a single literal value.
    Const(&'a Value),
    /// `enum`: ordered literal values.
    Enum(&'a [Value]),
    /// `type: "object"` with `properties`.
    Object(&'a Map<String, Value>),
    /// `type: "array"` with `items` (single schema for every element).
    Array(&'a Value),
    Primitive(Primitive),
}

impl<'a> SchemaNode<'a> {
    /// Checks are ordered: union, const, enum, object, array, primitive.
    /// The first key that is present decides, even if a later one would match.
    pub fn classify(schema: &'a Value) -> Result<Self, SchemaError> {
        let unsupported = || SchemaError::UnsupportedNode { node: schema.clone() };
        let Value::Object(obj) = schema else {
            return Err(unsupported());
        };

        if let Some(alts) = obj.get("oneOf").or_else(|| obj.get("anyOf")) {
            let alts = alts.as_array().ok_or_else(unsupported)?;
            return Ok(SchemaNode::Union(alts));
        }
        if let Some(value) = obj.get("const") {
            return Ok(SchemaNode::Const(value));
        }
        if let Some(values) = obj.get("enum") {
            let values = values.as_array().ok_or_else(unsupported)?;
            return Ok(SchemaNode::Enum(values));
        }

        let ty = obj.get("type").and_then(Value::as_str);
        match ty {
            Some("object") => {
                let props = obj.get("properties").and_then(Value::as_object);
                props.map(SchemaNode::Object).ok_or_else(unsupported)
            }
            Some("array") => obj.get("items").map(SchemaNode::Array).ok_or_else(unsupported),
            Some(name) => Primitive::from_type_name(name)
                .map(SchemaNode::Primitive)
                .ok_or_else(unsupported),
            None => Err(unsupported()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaNode::Union(_) => "union",
            SchemaNode::Const(_) => "const",
            SchemaNode::Enum(_) => "enum",
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
            SchemaNode::Primitive(p) => p.type_name(),
        }
    }
}
