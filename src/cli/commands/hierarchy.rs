//! `hierarchy`: validate and print a documentation hierarchy listing.

use serde::Serialize;

use crate::cli::args::{HierarchyArgs, OutputFormat};
use crate::cli::commands::read_input;
use crate::doctree::{self, HierarchyIssue, HierarchyNode};
use crate::error::AthenaError;

#[derive(Debug, Serialize)]
struct HierarchyReport<'a> {
    nodes: usize,
    issues: &'a [HierarchyIssue],
    tree: &'a [HierarchyNode],
}

/// Indented outline, one node per line. The href follows in parentheses
/// when there is one.
#[must_use]
pub fn render(nodes: &[HierarchyNode]) -> String {
    doctree::walk(nodes)
        .map(|(depth, node)| {
            let indent = "  ".repeat(depth);
            match &node.href {
                Some(href) => format!("{indent}{} ({href})\n", node.label),
                None => format!("{indent}{}\n", node.label),
            }
        })
        .collect()
}

/// Parses, validates and prints a listing.
///
/// # Errors
///
/// Returns [`AthenaError::Hierarchy`] if the listing does not parse,
/// [`AthenaError::Usage`] if `--find` matches nothing, and
/// [`AthenaError::Format`] if validation reports any issue.
pub fn run(args: &HierarchyArgs) -> Result<(), AthenaError> {
    let data = read_input(&args.file)?;
    let text = String::from_utf8_lossy(&data);
    let nodes = doctree::parse_hierarchy(&text)?;
    let issues = doctree::validate(&nodes, args.max_depth);

    let selected: Vec<HierarchyNode> = match &args.find {
        Some(label) => {
            let node = doctree::find(&nodes, label)
                .ok_or_else(|| AthenaError::Usage(format!("no node labelled '{label}'")))?;
            vec![node.clone()]
        }
        None => nodes,
    };

    match args.format {
        OutputFormat::Human => {
            print!("{}", render(&selected));
            for issue in &issues {
                eprintln!("issue: {issue}");
            }
        }
        OutputFormat::Json => {
            let report = HierarchyReport {
                nodes: doctree::walk(&selected).count(),
                issues: &issues,
                tree: &selected,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(crate::error::FormatError::InvalidData(format!(
            "hierarchy listing has {} issue(s)",
            issues.len()
        ))
        .into())
    }
}
