//! Text elements: plain text, paragraphs, lists and spacing

use super::Element;
use crate::escape::escape_latex;

/// Inline text; escaped unless created with [`Text::raw`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    text: String,
    raw: bool,
}

impl Text {
    /// Literal text, escaped on render
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            raw: false,
        }
    }

    /// Caller-supplied LaTeX markup, emitted verbatim
    pub fn raw(markup: impl Into<String>) -> Self {
        Self {
            text: markup.into(),
            raw: true,
        }
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

impl Element for Text {
    fn render(&self) -> String {
        if self.raw {
            self.text.clone()
        } else {
            escape_latex(&self.text)
        }
    }
}

/// A paragraph, separated from what follows by a blank line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Element for Paragraph {
    fn render(&self) -> String {
        if self.text.is_empty() {
            return String::new();
        }
        format!("{}\n", escape_latex(&self.text))
    }
}

/// Bulleted or numbered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemList {
    items: Vec<String>,
    ordered: bool,
}

impl ItemList {
    pub fn new<I, S>(items: I, ordered: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            ordered,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl Element for ItemList {
    fn render(&self) -> String {
        if self.items.is_empty() {
            return String::new();
        }
        let env = if self.ordered { "enumerate" } else { "itemize" };
        let mut output = format!("\\begin{{{}}}\n", env);
        for item in &self.items {
            output.push_str(&format!("    \\item {}\n", escape_latex(item)));
        }
        output.push_str(&format!("\\end{{{}}}\n", env));
        output
    }
}

/// Full-width horizontal rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Divider;

impl Element for Divider {
    fn render(&self) -> String {
        "\\noindent\\rule{\\textwidth}{0.4pt}\n".to_string()
    }
}

/// Blank vertical space, e.g. room for handwritten work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerticalSpace {
    height: String,
}

impl VerticalSpace {
    pub fn new(height: impl Into<String>) -> Self {
        Self {
            height: height.into(),
        }
    }
}

impl Element for VerticalSpace {
    fn render(&self) -> String {
        format!("\\vspace{{{}}}\n", self.height)
    }
}
