//! LaTeX markup generation
//!
//! Walks a finished [`Document`] and produces the complete `.tex` source:
//! preamble, metadata, body blocks in order, closing environments. Rendering
//! is pure; the same document always yields the same text.

use crate::document::{Block, Document, Section};
use crate::elements::Element;
use crate::error::UsageError;
use crate::escape::{escape_latex, format_ratio};
use crate::preamble::{Package, FONTSPEC_SKIPPED};
use itertools::Itertools;

/// Render a document to LaTeX markup
///
/// # Parameters
/// * `doc` - The finished document
///
/// # Returns
/// * `Ok(String)` - The complete markup text
/// * `Err(UsageError)` - Duplicate labels, or a font file with an engine that cannot load it
pub fn render(doc: &Document) -> Result<String, UsageError> {
    check_invariants(doc)?;

    let mut output = String::new();
    output.push_str(&generate_preamble(doc));
    output.push('\n');
    output.push_str(&generate_front_matter(doc));

    for block in doc.body() {
        match block {
            Block::Section(section) => output.push_str(&generate_section(section)),
            Block::Element(element) => {
                output.push_str(&element.render());
                output.push('\n');
            }
        }
    }

    if !doc.font().is_file() {
        output.push_str("\\end{CJK}\n");
    }
    output.push_str("\\end{document}\n");

    log::debug!(
        "Rendered {} blocks into {} bytes of markup",
        doc.body().len(),
        output.len()
    );
    Ok(output)
}

/// Re-check what `build()` guarantees
fn check_invariants(doc: &Document) -> Result<(), UsageError> {
    if let Some(label) = doc.labels().into_iter().duplicates().next() {
        return Err(UsageError::DuplicateLabel {
            label: label.to_string(),
        });
    }
    if doc.font().is_file() && !doc.engine().supports_font_files() {
        return Err(UsageError::EngineFontMismatch {
            engine: doc.engine().to_string(),
        });
    }
    Ok(())
}

/// Generate everything before `\begin{document}`
fn generate_preamble(doc: &Document) -> String {
    let preamble = doc.preamble();
    let font_file = doc.font().is_file();
    let mut output = String::new();

    match &preamble.class.options {
        Some(opts) if !opts.is_empty() => output.push_str(&format!(
            "\\documentclass[{}]{{{}}}\n",
            opts, preamble.class.name
        )),
        _ => output.push_str(&format!("\\documentclass{{{}}}\n", preamble.class.name)),
    }

    // fontspec must precede xeCJK, and both replace the pdflatex encodings
    if font_file {
        output.push_str(&Package::new("fontspec").render());
        output.push_str(&Package::new("xeCJK").render());
    }
    for package in preamble.packages.iter() {
        if font_file
            && (FONTSPEC_SKIPPED.contains(&package.name.as_str())
                || package.name == "fontspec"
                || package.name == "xeCJK")
        {
            continue;
        }
        output.push_str(&package.render());
    }

    if let Some(directives) = doc.font().render_directives() {
        output.push_str(&directives);
    }

    if let Some(geometry) = preamble.margins.render() {
        output.push_str(&geometry);
    }

    if let Some(spacing) = preamble.line_spacing {
        if !preamble.packages.contains("setspace") {
            output.push_str(&Package::new("setspace").render());
        }
        output.push_str(&format!("\\setstretch{{{}}}\n", format_ratio(spacing)));
    }

    for command in &preamble.commands {
        output.push_str(command);
    }

    let metadata = doc.metadata();
    let title = if metadata.raw_title {
        metadata.title.clone()
    } else {
        escape_latex(&metadata.title)
    };
    output.push_str(&format!("\\title{{{}}}\n", title));
    output.push_str(&format!("\\author{{{}}}\n", escape_latex(&metadata.author)));
    if metadata.date.is_empty() {
        output.push_str("\\date{\\today}\n");
    } else {
        output.push_str(&format!("\\date{{{}}}\n", escape_latex(&metadata.date)));
    }

    output
}

/// Generate `\begin{document}` through the abstract
fn generate_front_matter(doc: &Document) -> String {
    let mut output = "\\begin{document}\n".to_string();

    if let Some(font) = doc.font().builtin() {
        output.push_str(&format!("\\begin{{CJK}}{{UTF8}}{{{}}}\n", font.id()));
    }

    if !doc.title().is_empty() {
        output.push_str("\\maketitle\n");
    }

    if let Some(text) = &doc.metadata().abstract_text {
        output.push_str("\\begin{abstract}\n");
        output.push_str(&escape_latex(text));
        output.push_str("\n\\end{abstract}\n");
    }

    output.push('\n');
    output
}

/// Generate a section heading followed by its children
fn generate_section(section: &Section) -> String {
    let mut output = section.heading().render();
    output.push('\n');

    for child in section.children() {
        output.push_str(&child.render());
        output.push('\n');
    }

    output
}
