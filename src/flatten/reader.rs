//! Reading values files into [`Node`] trees
//!
//! Comment lines and blank lines are dropped before the YAML parser sees the
//! document, and merge keys (`<<: *anchor`) are expanded after parsing. Keys
//! must be scalars; numeric and boolean keys are converted to their YAML
//! text. Tagged values are reduced to the value they wrap.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use tracing::{debug, info, instrument};

use crate::error::{FlatvarsError, Result};
use crate::flatten::types::{Mapping, Node, Scalar, DEFAULT_MAX_NESTING};

// Whole-line comments and whitespace-only lines
static IGNORED_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#.*)?$").unwrap());

/// Drop comment lines and blank lines from a values document
pub fn strip_comments(source: &str) -> String {
    source
        .lines()
        .filter(|line| !IGNORED_LINE_REGEX.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a values document into a mapping
pub fn parse_values(source: &str) -> Result<Mapping> {
    parse_values_with_limit(source, DEFAULT_MAX_NESTING)
}

/// Parse a values document, rejecting trees nested deeper than `max_nesting`
pub fn parse_values_with_limit(source: &str, max_nesting: usize) -> Result<Mapping> {
    let stripped = strip_comments(source);
    if stripped.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let mut document: Value = serde_yaml::from_str(&stripped)?;
    // Resolve `<<: *anchor` merge keys before they can leak into paths
    document.apply_merge()?;
    match document {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => convert_mapping(mapping, 0, max_nesting),
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(mapping) => convert_mapping(mapping, 0, max_nesting),
            other => Err(root_error(&other)),
        },
        other => Err(root_error(&other)),
    }
}

/// Load a values file from disk
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn load_values(path: &Path, max_nesting: usize) -> Result<Mapping> {
    if !path.exists() {
        return Err(FlatvarsError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let source = fs::read_to_string(path)?;
    let values = parse_values_with_limit(&source, max_nesting)?;
    info!(top_level_keys = values.len(), "parsed values file");
    Ok(values)
}

fn root_error(value: &Value) -> FlatvarsError {
    FlatvarsError::malformed(format!(
        "expected a mapping at the top level, found {}",
        kind_of(value)
    ))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn convert_mapping(mapping: serde_yaml::Mapping, depth: usize, max_nesting: usize) -> Result<Mapping> {
    if depth > max_nesting {
        return Err(FlatvarsError::NestingTooDeep { limit: max_nesting });
    }

    let mut converted = Mapping::new();
    for (key, value) in mapping {
        let key = key_to_string(key)?;
        let node = convert_value(value, depth + 1, max_nesting)?;
        if converted.insert(key.clone(), node).is_some() {
            debug!(key = %key, "duplicate key after conversion, keeping the later value");
        }
    }
    Ok(converted)
}

fn convert_value(value: Value, depth: usize, max_nesting: usize) -> Result<Node> {
    if depth > max_nesting {
        return Err(FlatvarsError::NestingTooDeep { limit: max_nesting });
    }

    let node = match value {
        Value::Null => Node::Scalar(Scalar::Null),
        Value::Bool(flag) => Node::Scalar(Scalar::Bool(flag)),
        Value::Number(number) => Node::Scalar(Scalar::Number(number)),
        Value::String(text) => Node::Scalar(Scalar::String(text)),
        Value::Sequence(items) => Node::Sequence(
            items
                .into_iter()
                .map(|item| convert_value(item, depth + 1, max_nesting))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Mapping(mapping) => Node::Mapping(convert_mapping(mapping, depth, max_nesting)?),
        Value::Tagged(tagged) => convert_value(tagged.value, depth, max_nesting)?,
    };
    Ok(node)
}

fn key_to_string(key: Value) -> Result<String> {
    match key {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => key_to_string(tagged.value),
        other => Err(FlatvarsError::malformed(format!(
            "mapping keys must be scalars, found {}",
            kind_of(&other)
        ))),
    }
}
