//! End-to-end grammar output for tool-call style schemas.
use json_gbnf::grammar::Primitive;
use json_gbnf::{PropOrder, SchemaError, compile, compile_grammar};
use serde_json::{Value, json};

fn tool_call_schema() -> Value {
    json!({
        "oneOf": [
            {
                "type": "object",
                "properties": {
                    "function": {"const": "a"},
                    "arguments": {"type": "object", "properties": {"x": {"type": "string"}}}
                }
            },
            {
                "type": "object",
                "properties": {
                    "function": {"const": "b"},
                    "arguments": {"type": "object", "properties": {"y": {"type": "number"}}}
                }
            }
        ]
    })
}

fn lhs_names(grammar: &str) -> Vec<&str> {
    grammar
        .lines()
        .map(|line| line.split_once(" ::= ").expect("rule line").0)
        .collect()
}

#[test]
fn tool_call_union_without_prop_order() {
    let grammar = compile(&tool_call_schema(), None).unwrap();
    let string = Primitive::String.production();
    let number = Primitive::Number.production();
    let expected = [
        r#"space ::= " "?"#.to_string(),
        format!("string ::= {string}"),
        r#"0-arguments ::= "{" space "\"x\"" space ":" space string "}" space"#.to_string(),
        r#"0-function ::= "\"a\"""#.to_string(),
        r#"0 ::= "{" space "\"arguments\"" space ":" space 0-arguments "," space "\"function\"" space ":" space 0-function "}" space"#.to_string(),
        format!("number ::= {number}"),
        r#"1-arguments ::= "{" space "\"y\"" space ":" space number "}" space"#.to_string(),
        r#"1-function ::= "\"b\"""#.to_string(),
        r#"1 ::= "{" space "\"arguments\"" space ":" space 1-arguments "," space "\"function\"" space ":" space 1-function "}" space"#.to_string(),
        "root ::= 0 | 1".to_string(),
    ];
    assert_eq!(grammar, expected.join("\n") + "\n");
}

#[test]
fn tool_call_union_with_prop_order() {
    let order: PropOrder = [("function".to_string(), 0.0), ("arguments".to_string(), 1.0)].into();
    let grammar = compile_grammar(&tool_call_schema(), Some(&order)).unwrap();
    let names: Vec<_> = grammar.rules().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        ["space", "0-function", "string", "0-arguments", "0", "1-function", "number", "1-arguments", "1", "root"]
    );
    assert_eq!(
        grammar.get("0"),
        Some(r#""{" space "\"function\"" space ":" space 0-function "," space "\"arguments\"" space ":" space 0-arguments "}" space"#)
    );
}

#[test]
fn prop_order_puts_ranked_property_first() {
    let schema = json!({
        "type": "object",
        "properties": {"b": {"type": "string"}, "a": {"type": "string"}}
    });
    let order: PropOrder = [("a".to_string(), 0.0), ("b".to_string(), 1.0)].into();
    let grammar = compile_grammar(&schema, Some(&order)).unwrap();
    let root = grammar.get("root").unwrap();
    assert!(root.find(r#""\"a\"""#).unwrap() < root.find(r#""\"b\"""#).unwrap());

    let reversed: PropOrder = [("a".to_string(), 1.0), ("b".to_string(), 0.0)].into();
    let grammar = compile_grammar(&schema, Some(&reversed)).unwrap();
    let root = grammar.get("root").unwrap();
    assert!(root.find(r#""\"b\"""#).unwrap() < root.find(r#""\"a\"""#).unwrap());
}

#[test]
fn primitive_rules_are_shared_across_branches() {
    let schema = json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "meta": {"type": "object", "properties": {"note": {"type": "string"}}}
        }
    });
    let grammar = compile(&schema, None).unwrap();
    let names = lhs_names(&grammar);
    assert_eq!(names.iter().filter(|n| **n == "string").count(), 1);
    assert_eq!(grammar.matches(Primitive::String.production()).count(), 1);
    assert!(grammar.contains("\ntags ::= \"[\" space (string (\",\" space string)*)? \"]\" space\n"));
}

#[test]
fn const_with_quote_and_newline_is_escaped() {
    let grammar = compile_grammar(&json!({"const": "say \"hi\"\nbye"}), None).unwrap();
    let root = grammar.get("root").unwrap();
    // JSON-encoded, then quotes escaped for the grammar literal
    assert_eq!(root, r#""\"say \\"hi\\"\nbye\"""#);
    assert!(root.starts_with('"') && root.ends_with('"'));
    assert!(!root.contains('\n'));
}

#[test]
fn unknown_type_is_unsupported() {
    let err = compile(&json!({"type": "foo"}), None).unwrap_err();
    let SchemaError::UnsupportedNode { node } = &err;
    assert_eq!(node, &json!({"type": "foo"}));
    assert_eq!(err.to_string(), r#"unrecognized schema: {"type":"foo"}"#);
}

#[test]
fn failure_deep_in_a_union_aborts_the_whole_compile() {
    let schema = json!({
        "anyOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "tuple"}}
        ]
    });
    assert!(compile(&schema, None).is_err());
}

#[test]
fn output_is_deterministic() {
    let schema = tool_call_schema();
    let order: PropOrder = [("function".to_string(), 0.0)].into();
    let first = compile(&schema, Some(&order)).unwrap();
    for _ in 0..5 {
        assert_eq!(compile(&schema, Some(&order)).unwrap(), first);
    }
}

#[test]
fn nested_unions_name_alternatives_by_path() {
    let schema = json!({
        "type": "object",
        "properties": {
            "value": {"anyOf": [{"type": "integer"}, {"enum": ["auto", "none"]}]}
        }
    });
    let grammar = compile_grammar(&schema, None).unwrap();
    assert_eq!(grammar.get("value-1"), Some(r#""\"auto\"" | "\"none\"""#));
    assert_eq!(grammar.get("value"), Some("integer | value-1"));
}

#[test]
fn top_level_property_named_root_keeps_the_start_rule() {
    let schema = json!({
        "type": "object",
        "properties": {
            "root": {"type": "string"},
            "tag": {"const": "root"}
        }
    });
    let grammar = compile(&schema, None).unwrap();
    let string = Primitive::String.production();
    let expected = [
        r#"space ::= " "?"#.to_string(),
        format!("string ::= {string}"),
        r#"tag ::= "\"root\"""#.to_string(),
        r#"root ::= "{" space "\"root\"" space ":" space string "," space "\"tag\"" space ":" space tag "}" space"#.to_string(),
    ];
    assert_eq!(grammar, expected.join("\n") + "\n");

    let nested = json!({
        "type": "object",
        "properties": {"root": {"type": "array", "items": {"enum": [1, 2]}}}
    });
    let grammar = compile_grammar(&nested, None).unwrap();
    let names: Vec<_> = grammar.rules().map(|(n, _)| n).collect();
    assert_eq!(names, ["space", "root-item", "root0", "root"]);
    assert!(grammar.get("root").unwrap().contains(r#"":" space root0 "}""#));
}
