//! Rendering step documentation for a content pane.

use std::fmt::Write;

use crate::model::Step;

/// Turns a step into displayable documentation.
pub trait DocRenderer {
    /// `label` is the heading shown above the description, e.g.
    /// "Intro · Step 2 of 5".
    fn render(&self, label: &str, step: &Step) -> String;
}

/// Plain-text rendering: heading, markdown body as-is, then the location.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl DocRenderer for TextRenderer {
    fn render(&self, label: &str, step: &Step) -> String {
        let mut out = String::new();
        out.push_str(label);
        out.push_str("\n\n");
        out.push_str(&step.title);
        if !step.description.is_empty() {
            out.push_str("\n\n");
            out.push_str(step.description.trim_end());
        }
        if let Some(location) = &step.location {
            let _ = write!(out, "\n\n{}:{}", location.file.display(), location.line);
        }
        out
    }
}
