//! Documentation hierarchy listings.
//!
//! A listing is a JSON array of `[label, href, children]` records, where
//! `children` is `null` for a leaf or another array of records. `href` is
//! `null` for entries with no page of their own, such as external base
//! classes. Generated listings wrap the array in `var hierarchy = ...;`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::HierarchyError;

/// Nesting limit used when the caller has no better bound.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// One entry of a hierarchy listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    pub label: String,
    /// `None` when the entry links nowhere.
    pub href: Option<String>,
    /// `None` marks a leaf.
    pub children: Option<Vec<HierarchyNode>>,
}

impl HierarchyNode {
    #[must_use]
    pub fn leaf(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
            children: None,
        }
    }

    #[must_use]
    pub fn branch(
        label: impl Into<String>,
        href: impl Into<String>,
        children: Vec<Self>,
    ) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
            children: Some(children),
        }
    }

    /// Branch without a page, grouping the children under `label`.
    #[must_use]
    pub fn group(label: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            label: label.into(),
            href: None,
            children: Some(children),
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children, empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.children.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Strips a `var <ident> =` prefix and a trailing `;` if present.
fn strip_wrapper(text: &str) -> &str {
    let mut body = text.trim();
    for keyword in ["var", "let", "const"] {
        let Some(rest) = body.strip_prefix(keyword) else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        if let Some((_, value)) = rest.split_once('=') {
            body = value.trim();
        }
        break;
    }
    body.strip_suffix(';').unwrap_or(body).trim_end()
}

fn malformed(path: &str, message: impl Into<String>) -> HierarchyError {
    HierarchyError::Malformed {
        path: if path.is_empty() { "root".to_string() } else { path.to_string() },
        message: message.into(),
    }
}

fn parse_records(value: &Value, path: &str) -> Result<Vec<HierarchyNode>, HierarchyError> {
    let Value::Array(records) = value else {
        return Err(malformed(path, "expected an array of records"));
    };
    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(record, &format!("{path}[{index}]")))
        .collect()
}

fn parse_record(value: &Value, path: &str) -> Result<HierarchyNode, HierarchyError> {
    let Value::Array(fields) = value else {
        return Err(malformed(path, "record is not an array"));
    };
    let [label, href, children] = fields.as_slice() else {
        return Err(malformed(
            path,
            format!("record has {} elements, expected 3", fields.len()),
        ));
    };
    let Value::String(label) = label else {
        return Err(malformed(path, "label is not a string"));
    };
    let href = match href {
        Value::String(href) => Some(href.clone()),
        Value::Null => None,
        _ => return Err(malformed(path, "href must be a string or null")),
    };
    let children = match children {
        Value::Null => None,
        Value::Array(_) => Some(parse_records(children, path)?),
        _ => return Err(malformed(path, "children must be null or an array")),
    };
    Ok(HierarchyNode {
        label: label.clone(),
        href,
        children,
    })
}

/// Parses a listing, bare or wrapped in `var <ident> = ...;`.
///
/// # Errors
///
/// Returns [`HierarchyError::Json`] if the body is not JSON and
/// [`HierarchyError::Malformed`] with the index path of the first record
/// that does not have the `[label, href, children]` shape.
pub fn parse_hierarchy(text: &str) -> Result<Vec<HierarchyNode>, HierarchyError> {
    let value: Value = serde_json::from_str(strip_wrapper(text))?;
    let nodes = parse_records(&value, "")?;
    debug!(top_level = nodes.len(), total = walk(&nodes).count(), "parsed hierarchy listing");
    Ok(nodes)
}

// ============================================================================
// Traversal
// ============================================================================

/// Depth-first, pre-order iterator over a listing.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(usize, std::slice::Iter<'a, HierarchyNode>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (depth, iter) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(node) => {
                    if let Some(children) = &node.children {
                        self.stack.push((depth + 1, children.iter()));
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Yields `(depth, node)` for every node, parents before children. Top-level
/// records have depth 0.
#[must_use]
pub fn walk(nodes: &[HierarchyNode]) -> Walk<'_> {
    Walk {
        stack: vec![(0, nodes.iter())],
    }
}

/// First node in walk order whose label is exactly `label`.
#[must_use]
pub fn find<'a>(nodes: &'a [HierarchyNode], label: &str) -> Option<&'a HierarchyNode> {
    walk(nodes).map(|(_, node)| node).find(|node| node.label == label)
}

// ============================================================================
// Validation
// ============================================================================

/// A problem found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HierarchyIssue {
    EmptyLabel { path: String },
    EmptyHref { path: String, label: String },
    TooDeep { path: String, label: String, depth: usize, limit: usize },
}

impl fmt::Display for HierarchyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLabel { path } => write!(f, "{path}: empty label"),
            Self::EmptyHref { path, label } => write!(f, "{path}: '{label}' has an empty href"),
            Self::TooDeep {
                path,
                label,
                depth,
                limit,
            } => write!(f, "{path}: '{label}' is nested {depth} deep (limit {limit})"),
        }
    }
}

fn validate_level(
    nodes: &[HierarchyNode],
    depth: usize,
    max_depth: usize,
    path: &str,
    issues: &mut Vec<HierarchyIssue>,
) {
    for (index, node) in nodes.iter().enumerate() {
        let path = format!("{path}[{index}]");
        if depth > max_depth {
            // Everything below is at least as deep; report the subtree once.
            issues.push(HierarchyIssue::TooDeep {
                path,
                label: node.label.clone(),
                depth,
                limit: max_depth,
            });
            continue;
        }
        if node.label.is_empty() {
            issues.push(HierarchyIssue::EmptyLabel { path: path.clone() });
        }
        if node.href.as_deref() == Some("") {
            issues.push(HierarchyIssue::EmptyHref {
                path: path.clone(),
                label: node.label.clone(),
            });
        }
        validate_level(node.children(), depth + 1, max_depth, &path, issues);
    }
}

/// Reports empty labels, empty hrefs, and nodes nested deeper than
/// `max_depth`. A `null` href is not an issue. An empty result means the
/// listing is well formed.
#[must_use]
pub fn validate(nodes: &[HierarchyNode], max_depth: usize) -> Vec<HierarchyIssue> {
    let mut issues = Vec::new();
    validate_level(nodes, 0, max_depth, "", &mut issues);
    issues
}
