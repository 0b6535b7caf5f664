//! Mathematical elements; bodies are caller-supplied markup and never escaped

use super::{push_label, Element};

/// A single equation, inline (`$..$`) or displayed (`\[..\]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    body: String,
    inline: bool,
    label: Option<String>,
}

impl Equation {
    /// Displayed equation
    pub fn display(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            inline: false,
            label: None,
        }
    }

    /// Inline equation
    pub fn inline(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            inline: true,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl From<&str> for Equation {
    fn from(body: &str) -> Self {
        Self::display(body)
    }
}

impl From<String> for Equation {
    fn from(body: String) -> Self {
        Self::display(body)
    }
}

impl Element for Equation {
    fn render(&self) -> String {
        if self.body.is_empty() {
            return String::new();
        }
        if self.inline {
            return format!("${}$", self.body);
        }
        let mut output = format!("\\[\n    {}\n\\]", self.body);
        if let Some(label) = &self.label {
            output.push_str(&format!("\n\\label{{{}}}", label));
        }
        output
    }

    fn labels(&self) -> Vec<&str> {
        self.label.as_deref().into_iter().collect()
    }
}

/// Multi-line equations in an `align` environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Align {
    lines: Vec<String>,
    label: Option<String>,
    numbered: bool,
    vspace: Option<String>,
}

impl Align {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            label: None,
            numbered: true,
            vspace: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Use `align*` (no equation numbers)
    pub fn unnumbered(mut self) -> Self {
        self.numbered = false;
        self
    }

    /// Vertical space emitted before the environment
    pub fn with_vspace(mut self, space: impl Into<String>) -> Self {
        self.vspace = Some(space.into());
        self
    }
}

impl Element for Align {
    fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let env = if self.numbered { "align" } else { "align*" };
        let mut output = String::new();
        if let Some(space) = &self.vspace {
            output.push_str(&format!("\\vspace{{{}}}\n", space));
        }
        output.push_str(&format!("\\begin{{{}}}\n", env));
        for line in &self.lines {
            output.push_str(&format!("    {}\n", line));
        }
        push_label(&mut output, "    ", self.label.as_deref());
        output.push_str(&format!("\\end{{{}}}\n", env));
        output
    }

    fn labels(&self) -> Vec<&str> {
        self.label.as_deref().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_equation() {
        assert_eq!(Equation::inline("x^2").render(), "$x^2$");
    }

    #[test]
    fn test_display_equation_with_label() {
        let eq = Equation::display("E = mc^2").with_label("eq:energy");
        assert_eq!(eq.render(), "\\[\n    E = mc^2\n\\]\n\\label{eq:energy}");
        assert_eq!(eq.labels(), vec!["eq:energy"]);
    }

    #[test]
    fn test_equation_body_not_escaped() {
        let eq = Equation::display("\\frac{a_1}{b} \\% 100");
        assert!(eq.render().contains("\\frac{a_1}{b} \\% 100"));
    }

    #[test]
    fn test_align_numbered_and_starred() {
        let align = Align::new(["a &= b \\\\", "c &= d"]).with_label("eq:sys");
        let out = align.render();
        assert!(out.starts_with("\\begin{align}\n"));
        assert!(out.contains("    \\label{eq:sys}\n"));
        assert!(out.ends_with("\\end{align}\n"));

        let starred = Align::new(["x &= 1"]).unnumbered().with_vspace("-1em").render();
        assert!(starred.starts_with("\\vspace{-1em}\n\\begin{align*}"));
    }
}
