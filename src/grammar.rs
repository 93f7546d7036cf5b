//! JSON Schema → GBNF grammar compiler.
//!
//! A single depth-first pass over the schema tree. Child rules are
//! registered before the parent rule that references them, and the rule
//! table is serialized in registration order.
//!
//! Supported subset: `oneOf`/`anyOf`, `const`, `enum`, objects with
//! `properties`, arrays with a single `items` schema, and the primitive
//! types. Every property is emitted, in `PropOrder` rank then name order.
pub mod literal;
pub mod primitive;
pub mod rules;

use std::collections::HashMap;
use std::fmt;

use ordered_float::OrderedFloat;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::SchemaError;
use crate::schema::SchemaNode;

pub use literal::{constant_literal, format_literal};
pub use primitive::Primitive;
pub use rules::{ROOT_RULE, RuleTable, sanitize_rule_name};

/// Property name → sort rank for object rules. Unranked properties sort
/// after every ranked one.
pub type PropOrder = HashMap<String, f64>;

// ------------------------------- Front API -------------------------------- //

/// Compile `schema` into GBNF text whose top-level rule is `root`.
pub fn compile(schema: &Value, prop_order: Option<&PropOrder>) -> Result<String, SchemaError> {
    compile_grammar(schema, prop_order).map(|g| g.to_string())
}

/// Like [`compile`], but keeps the rules as a [`Grammar`].
pub fn compile_grammar(schema: &Value, prop_order: Option<&PropOrder>) -> Result<Grammar, SchemaError> {
    let mut converter = SchemaGrammarConverter::new(prop_order);
    converter.visit(schema, "")?;
    let grammar = converter.into_grammar();
    debug!(rules = grammar.len(), "compiled schema to grammar");
    Ok(grammar)
}

// ------------------------------- Converter -------------------------------- //

pub struct SchemaGrammarConverter<'o> {
    prop_order: Option<&'o PropOrder>,
    rules: RuleTable,
}

impl<'o> SchemaGrammarConverter<'o> {
    pub fn new(prop_order: Option<&'o PropOrder>) -> Self {
        Self { prop_order, rules: RuleTable::new() }
    }

    /// Compile `schema` under the hint `name` (`""` means the root) and
    /// return the rule name that matches it.
    ///
    /// On error the table may hold rules from the part of the tree already
    /// visited; callers should drop the converter.
    pub fn visit(&mut self, schema: &Value, name: &str) -> Result<String, SchemaError> {
        let node = SchemaNode::classify(schema)?;
        let shown = if name.is_empty() { ROOT_RULE } else { name };
        trace!(name = shown, kind = node.kind(), "visiting schema node");

        match node {
            SchemaNode::Union(alts) => {
                let refs = alts
                    .iter()
                    .enumerate()
                    .map(|(i, alt)| self.visit(alt, &child_name(name, &i.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.add_rule(name, refs.join(" | ")))
            }
            SchemaNode::Const(value) => Ok(self.add_rule(name, constant_literal(value))),
            SchemaNode::Enum(values) => {
                let body = values.iter().map(constant_literal).collect::<Vec<_>>().join(" | ");
                Ok(self.add_rule(name, body))
            }
            SchemaNode::Object(props) => {
                let body = self.build_object_rule(props, name)?;
                Ok(self.add_rule(name, body))
            }
            SchemaNode::Array(items) => {
                let item = self.visit(items, &child_name(name, "item"))?;
                let body = format!(r#""[" space ({item} ("," space {item})*)? "]" space"#);
                Ok(self.add_rule(name, body))
            }
            // shared under the type name so every use reuses one rule
            SchemaNode::Primitive(p) if name.is_empty() => Ok(self.rules.add_root(p.production())),
            SchemaNode::Primitive(p) => Ok(self.rules.add(p.type_name(), p.production())),
        }
    }

    fn add_rule(&mut self, name: &str, body: String) -> String {
        if name.is_empty() {
            self.rules.add_root(body)
        } else {
            self.rules.add(name, body)
        }
    }

    fn build_object_rule(&mut self, props: &Map<String, Value>, name: &str) -> Result<String, SchemaError> {
        let mut sorted: Vec<(&String, &Value)> = props.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| self.rank(a).cmp(&self.rank(b)).then_with(|| a.cmp(b)));

        let mut rule = String::from(r#""{" space"#);
        for (i, (prop_name, prop_schema)) in sorted.into_iter().enumerate() {
            let prop_rule = self.visit(prop_schema, &child_name(name, prop_name))?;
            if i > 0 {
                rule.push_str(r#" "," space"#);
            }
            let key = constant_literal(&Value::String(prop_name.clone()));
            rule.push_str(&format!(r#" {key} space ":" space {prop_rule}"#));
        }
        rule.push_str(r#" "}" space"#);
        Ok(rule)
    }

    fn rank(&self, prop_name: &str) -> OrderedFloat<f64> {
        self.prop_order
            .and_then(|order| order.get(prop_name))
            .map(|&r| OrderedFloat(r))
            .unwrap_or(OrderedFloat(f64::INFINITY))
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// One `<name> ::= <body>` line per rule, in registration order.
    pub fn format_grammar(&self) -> String {
        let mut grammar = String::new();
        for (name, body) in self.rules.iter() {
            grammar.push_str(&format!("{name} ::= {body}\n"));
        }
        grammar
    }

    pub fn into_grammar(self) -> Grammar {
        Grammar { rules: self.rules.into_rules() }
    }
}

fn child_name(name: &str, suffix: &str) -> String {
    if name.is_empty() {
        suffix.to_string()
    } else {
        format!("{name}-{suffix}")
    }
}

// -------------------------------- Grammar --------------------------------- //

/// A finished grammar: `(name, body)` rules in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<(String, String)>,
}

impl Grammar {
    pub fn rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(n, b)| (n.as_str(), b.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.rules().find(|(n, _)| *n == name).map(|(_, b)| b)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parameter bag for the inference engine: `{"grammar": "<text>"}`.
    pub fn to_params(&self) -> Value {
        serde_json::json!({ "grammar": self.to_string() })
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, body) in &self.rules {
            writeln!(f, "{name} ::= {body}")?;
        }
        Ok(())
    }
}

// ------------------------------- Tests ------------------------------------ //
