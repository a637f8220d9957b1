//! Output formatting for CLI display.

use std::fmt::Write;

use codetour::{Tour, TreeNode};

/// One-line summary of a tour: short id, title, file, step count.
pub(super) fn format_tour_line(tour: &Tour) -> String {
    let id = tour.id().to_string();
    format!(
        "{}  {}  ({}, {})",
        &id[..8],
        tour.title(),
        tour.tour_file(),
        pluralize(tour.step_count(), "step")
    )
}

/// Indented outline, one node per line. Steps are numbered from 1.
pub(super) fn format_outline(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        let indent = "  ".repeat(node.depth());
        match node {
            TreeNode::Root => {
                let _ = writeln!(out, "{}", node.label());
            }
            TreeNode::Tour(tour) => {
                let _ = writeln!(out, "{indent}{}", format_tour_line(tour));
            }
            TreeNode::Step { index, step, .. } => {
                let _ = write!(out, "{indent}{}. {}", index + 1, step.title);
                if let Some(location) = &step.location {
                    let _ = write!(out, "  [{}:{}]", location.file.display(), location.line);
                }
                out.push('\n');
            }
        }
    }
    out
}

fn pluralize(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
