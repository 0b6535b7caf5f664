//! Renderable document elements
//!
//! Every element is a small immutable value implementing [`Element`]. The
//! renderer only ever calls [`Element::render`]; new element kinds are added
//! by implementing the trait, without touching the renderer.

mod boxes;
mod graphics;
mod math;
mod structure;
mod table;
mod text;

pub use boxes::{BoxKind, BoxStyle, TextBox};
pub use graphics::{Image, TikzPicture};
pub use math::{Align, Equation};
pub use structure::{DrawingSpace, Exercise, Heading, PageBreak, TableOfContents};
pub use table::Table;
pub use text::{Divider, ItemList, Paragraph, Text, VerticalSpace};

use crate::preamble::Package;
use std::fmt::Debug;

/// An atomic renderable unit of a document
pub trait Element: Debug + Send + Sync {
    /// Render the element to a LaTeX fragment
    ///
    /// Must be pure: the same element always renders to the same text.
    fn render(&self) -> String;

    /// Cross-reference labels owned by this element and its children
    fn labels(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Packages this element needs in the preamble
    fn required_packages(&self) -> Vec<Package> {
        Vec::new()
    }

    /// Extra preamble lines this element needs (`\usetikzlibrary{..}`, ...)
    fn preamble_commands(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whole-graph checks run by `build()`
    fn validate(&self) -> Result<(), crate::error::UsageError> {
        Ok(())
    }
}

/// Render a sequence of child elements, one per line
pub(crate) fn render_children(children: &[Box<dyn Element>]) -> String {
    let mut output = String::new();
    for child in children {
        output.push_str(&child.render());
        output.push('\n');
    }
    output
}

/// Collect the labels of a sequence of child elements
pub(crate) fn child_labels(children: &[Box<dyn Element>]) -> Vec<&str> {
    children.iter().flat_map(|c| c.labels()).collect()
}

pub(crate) fn child_packages(children: &[Box<dyn Element>]) -> Vec<Package> {
    children.iter().flat_map(|c| c.required_packages()).collect()
}

pub(crate) fn child_commands(children: &[Box<dyn Element>]) -> Vec<String> {
    children.iter().flat_map(|c| c.preamble_commands()).collect()
}

pub(crate) fn validate_children(
    children: &[Box<dyn Element>],
) -> Result<(), crate::error::UsageError> {
    children.iter().try_for_each(|c| c.validate())
}

/// Append `\label{..}` on its own line when a label is present
pub(crate) fn push_label(output: &mut String, indent: &str, label: Option<&str>) {
    if let Some(label) = label {
        output.push_str(&format!("{}\\label{{{}}}\n", indent, label));
    }
}
