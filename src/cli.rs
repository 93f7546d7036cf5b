//! Minimal CLI: schema → grammar | messages → flattened chat
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::grammar::{PropOrder, compile_grammar};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile JSON Schema to GBNF grammars, or flatten chat messages for the native formatter
#[derive(Parser, Debug)]
#[command(name = "json-gbnf", version)]
pub struct CommandLineInterface {
    /// log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile each input schema to a GBNF grammar
    Grammar(GrammarOut),
    /// flatten multi-part chat message content into plain strings
    Chat(ChatOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /response_format/schema)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ filter applied to each document (after --json-pointer); every output is one input
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GrammarOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// property order, e.g. `function,arguments` or `function=0,arguments=1`
    #[arg(long)]
    prop_order: Option<String>,

    /// JSON object of property name → rank (merged under --prop-order)
    #[arg(long)]
    prop_order_file: Option<PathBuf>,

    /// print `{"grammar": ...}` parameter JSON instead of raw grammar text
    #[arg(long)]
    params: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ChatOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every selected document from every input, labelled with its source path.
    fn load_documents(&self) -> Result<Vec<(String, Value)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let label = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({label})"))?;
            let json_value = serde_json::from_str::<Value>(&source)
                .with_context(|| format!("failed to parse JSON source file ({label})"))?;
            let json_value = match self.json_pointer.as_deref() {
                None => json_value,
                Some(ptr) => json_value
                    .pointer(ptr)
                    .cloned()
                    .with_context(|| format!("JSON pointer {ptr} selects nothing in ({label})"))?,
            };
            match self.jq_expr.as_deref() {
                None => documents.push((label, json_value)),
                Some(jq_expr) => {
                    let outputs = crate::jq_exec::run_filter(jq_expr, &json_value)
                        .with_context(|| format!("failed to apply jq expression to ({label})"))?;
                    documents.extend(outputs.into_iter().map(|v| (label.clone(), v)));
                }
            }
        }
        debug!(count = documents.len(), "loaded input documents");
        Ok(documents)
    }
}

impl GrammarOut {
    fn load_prop_order(&self) -> Result<Option<PropOrder>> {
        let mut order: Option<PropOrder> = None;
        if let Some(path) = self.prop_order_file.as_ref() {
            let src = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prop order file ({})", path.display()))?;
            let from_file: PropOrder = crate::path_de::from_str_with_path(&src)
                .with_context(|| format!("invalid prop order file ({})", path.display()))?;
            order = Some(from_file);
        }
        if let Some(list) = self.prop_order.as_deref() {
            let from_args = parse_prop_order(list)?;
            order.get_or_insert_with(PropOrder::new).extend(from_args);
        }
        Ok(order)
    }

    fn run(&self) -> Result<()> {
        let prop_order = self.load_prop_order()?;
        let documents = self.input_settings.load_documents()?;

        // each compile owns its rule table, so inputs go in parallel
        let grammars = documents
            .par_iter()
            .map(|(label, schema)| {
                compile_grammar(schema, prop_order.as_ref())
                    .with_context(|| format!("invalid schema in ({label})"))
            })
            .collect::<Result<Vec<_>>>()?;
        info!(count = grammars.len(), "compiled grammars");

        let output = if self.params {
            let mut params: Vec<Value> = grammars.iter().map(|g| g.to_params()).collect();
            let params = match params.len() {
                1 => params.remove(0),
                _ => Value::Array(params),
            };
            serde_json::to_string_pretty(&params)?
        } else if grammars.len() == 1 {
            grammars[0].to_string()
        } else {
            documents
                .iter()
                .zip(&grammars)
                .map(|((label, _), g)| format!("# {label}\n{g}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        write_output(self.out.as_deref(), &output)
    }
}

impl ChatOut {
    fn run(&self) -> Result<()> {
        let documents = self.input_settings.load_documents()?;
        let mut chats = Vec::with_capacity(documents.len());
        for (label, messages) in documents {
            let chat = crate::chat::normalize_value(messages)
                .with_context(|| format!("malformed chat messages in ({label})"))?;
            chats.push(serde_json::to_value(chat)?);
        }
        let output = match chats.len() {
            1 => chats.remove(0),
            _ => Value::Array(chats),
        };
        write_output(self.out.as_deref(), &serde_json::to_string_pretty(&output)?)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Grammar(target) => target.run(),
            Command::Chat(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Parse `a,b,c` (rank = position) or `a=0,b=2.5` (explicit ranks); forms may mix.
pub fn parse_prop_order(list: &str) -> Result<PropOrder> {
    let mut order = PropOrder::new();
    for (position, entry) in list.split(',').map(str::trim).filter(|e| !e.is_empty()).enumerate() {
        let (name, rank) = match entry.split_once('=') {
            Some((name, rank)) => {
                let rank = rank
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("invalid rank in prop order entry `{entry}`"))?;
                (name.trim(), rank)
            }
            None => (entry, position as f64),
        };
        if name.is_empty() {
            bail!("empty property name in prop order entry `{entry}`");
        }
        order.insert(name.to_string(), rank);
    }
    Ok(order)
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create ({})", parent.display()))?;
            }
            std::fs::write(out, contents)
                .with_context(|| format!("failed to write ({})", out.display()))
        }
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matched nothing is almost always a typo
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
