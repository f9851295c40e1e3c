//! YAML documents for DNA records.
//!
//! Both sides work on a small ordered node tree. Parsing goes through
//! `serde_yaml`; emitting is done here so scalars keep the exact text the
//! writer produced (hex integers, six-decimal floats, `True`/`False`).

mod reader;
mod writer;

pub use reader::YamlDocReader;
pub use writer::YamlDocWriter;

use serde_yaml::Value;

/// Key carrying the record type at the document root.
pub const DNA_TYPE_KEY: &str = "DNAType";

/// One node of a YAML document.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlNode {
    /// Number or bool text, emitted as is.
    Scalar(String),
    /// Free text, quoted on output when a plain scalar would not read back.
    Text(String),
    Sequence {
        items: Vec<YamlNode>,
        /// Emit as `[a, b]` instead of a block list.
        flow: bool,
    },
    Mapping(Vec<(String, YamlNode)>),
}

impl YamlNode {
    pub(crate) const fn empty_mapping() -> Self {
        Self::Mapping(Vec::new())
    }

    pub(crate) const fn empty_sequence(flow: bool) -> Self {
        Self::Sequence {
            items: Vec::new(),
            flow,
        }
    }

    /// Scalar text, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) | Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Value stored under `key`, if this is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub(crate) fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Scalar(String::new()),
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Sequence(items) => Self::Sequence {
                items: items.iter().map(Self::from_value).collect(),
                flow: false,
            },
            Value::Mapping(map) => Self::Mapping(
                map.iter()
                    .map(|(k, v)| (scalar_key(k), Self::from_value(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
        }
    }
}

fn scalar_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// Scalar text
// ============================================================================

/// Parses an integer the way C `strtol` does with base 0: optional sign,
/// then `0x` for hex, a leading `0` for octal, decimal otherwise. Parsing
/// stops at the first invalid digit; no digits yields 0.
#[must_use]
pub fn parse_int(text: &str) -> i128 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    let mut value: i128 = 0;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            break;
        };
        value = value.saturating_mul(i128::from(radix)).saturating_add(i128::from(digit));
    }
    if negative { -value } else { value }
}

/// Reads a float prefix like `strtod`; anything unparsable is 0.
#[must_use]
pub fn parse_float(text: &str) -> f64 {
    let text = text.trim();
    if let Ok(value) = text.parse() {
        return value;
    }
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().unwrap_or(0.0)
}

/// `t…` and `f…` decide by their first letter; any leading digit is true.
#[must_use]
pub fn parse_bool(text: &str) -> bool {
    match text.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('t') => true,
        Some(c) => c.is_ascii_digit(),
        None => false,
    }
}

/// Quotes `text` only when a plain scalar would not read back verbatim.
fn quote_string(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text.trim() != text
        || text.chars().any(|c| c.is_control())
        || !matches!(serde_yaml::from_str::<Value>(text), Ok(Value::String(ref s)) if s == text)
        || text.contains(": ")
        || text.contains(" #")
        || text.starts_with(['[', ']', '{', '}', ',', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`', '-', '?', '#']);
    if needs_quotes {
        serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
    } else {
        text.to_string()
    }
}

// ============================================================================
// Emitter
// ============================================================================

const INDENT: usize = 2;

/// Renders a node tree as block YAML.
pub(crate) fn emit(root: &YamlNode) -> String {
    let mut lines = Vec::new();
    emit_block(root, 0, &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn emit_inline(node: &YamlNode) -> Option<String> {
    match node {
        YamlNode::Scalar(text) => Some(text.clone()),
        YamlNode::Text(text) => Some(quote_string(text)),
        YamlNode::Sequence { items, .. } if items.is_empty() => Some("[]".to_string()),
        YamlNode::Mapping(entries) if entries.is_empty() => Some("{}".to_string()),
        YamlNode::Sequence { items, flow: true } if items.iter().all(|i| i.as_scalar().is_some()) => {
            let parts: Vec<String> = items.iter().filter_map(emit_inline).collect();
            Some(format!("[{}]", parts.join(", ")))
        }
        _ => None,
    }
}

fn emit_block(node: &YamlNode, indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    match node {
        YamlNode::Mapping(entries) => {
            for (key, value) in entries {
                let key = quote_string(key);
                match emit_inline(value) {
                    Some(text) => lines.push(format!("{pad}{key}: {text}")),
                    None => {
                        lines.push(format!("{pad}{key}:"));
                        emit_block(value, indent + INDENT, lines);
                    }
                }
            }
        }
        YamlNode::Sequence { items, .. } => {
            for item in items {
                if let Some(text) = emit_inline(item) {
                    lines.push(format!("{pad}- {text}"));
                    continue;
                }
                let start = lines.len();
                emit_block(item, indent + INDENT, lines);
                if let Some(first) = lines.get_mut(start) {
                    first.replace_range(..indent + INDENT, &format!("{pad}- "));
                }
            }
        }
        YamlNode::Scalar(text) => lines.push(format!("{pad}{text}")),
        YamlNode::Text(text) => lines.push(format!("{pad}{}", quote_string(text))),
    }
}
