//! Insertion-ordered rule table.
//!
//! Rules are emitted in the order their names were first registered, so the
//! table keeps a plain `Vec` for emission and a name → position map for
//! O(1) dedup and collision checks.
use std::collections::HashMap;
use tracing::debug;

use super::primitive::SPACE_RULE;

/// Name of the start rule. Only [`RuleTable::add_root`] may claim it.
pub const ROOT_RULE: &str = "root";

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTable {
    /// A fresh table holding only the `space` rule.
    pub fn new() -> Self {
        let mut table = Self { rules: Vec::new(), index: HashMap::new() };
        table.insert("space".to_string(), SPACE_RULE.to_string());
        table
    }

    /// Register `body` under (a sanitized form of) `name`, returning the
    /// name it is actually reachable by.
    ///
    /// - unused name → registered as is
    /// - same name, same body → existing name reused
    /// - same name, different body → first of `name0`, `name1`, … that is
    ///   either free or already holds this exact body
    ///
    /// A non-root rule whose name sanitizes to `root` is always suffixed.
    pub fn add(&mut self, name: &str, body: impl Into<String>) -> String {
        self.register(&sanitize_rule_name(name), body.into(), false)
    }

    /// Register the start rule under `root`, with the same dedup and
    /// suffix handling as [`RuleTable::add`].
    pub fn add_root(&mut self, body: impl Into<String>) -> String {
        self.register(ROOT_RULE, body.into(), true)
    }

    fn register(&mut self, esc_name: &str, body: String, is_root: bool) -> String {
        if is_root || esc_name != ROOT_RULE {
            match self.get(esc_name) {
                None => {
                    self.insert(esc_name.to_string(), body);
                    return esc_name.to_string();
                }
                Some(existing) if existing == body => {
                    debug!(rule = %esc_name, "reusing identical grammar rule");
                    return esc_name.to_string();
                }
                Some(_) => {}
            }
        }

        let mut i = 0usize;
        loop {
            let key = format!("{esc_name}{i}");
            match self.get(&key) {
                None => {
                    debug!(rule = %key, wanted = %esc_name, "rule name taken, registered with suffix");
                    self.insert(key.clone(), body);
                    return key;
                }
                Some(existing) if existing == body => return key,
                Some(_) => i += 1,
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.rules[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `(name, body)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(n, b)| (n.as_str(), b.as_str()))
    }

    pub fn into_rules(self) -> Vec<(String, String)> {
        self.rules
    }

    fn insert(&mut self, name: String, body: String) {
        debug!(rule = %name, "registered grammar rule");
        self.index.insert(name.clone(), self.rules.len());
        self.rules.push((name, body));
    }
}

/// Replace every run of characters outside `[A-Za-z0-9-]` with a single `-`.
pub fn sanitize_rule_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}
