//! Boxed call-outs: notes, warnings, info boxes and custom boxes

use super::Element;
use crate::escape::escape_latex;

/// Semantic kind of a box; presets carry a title and colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxKind {
    Note,
    Warning,
    Info,
    #[default]
    Custom,
}

impl BoxKind {
    fn preset(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Note => Some(("注意", "yellow")),
            Self::Warning => Some(("警告", "red")),
            Self::Info => Some(("情報", "blue")),
            Self::Custom => None,
        }
    }
}

/// How the box is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxStyle {
    /// `tcolorbox` environment with style options
    #[default]
    Tcolorbox,
    /// `\fbox` around a `\parbox` with a bold title line
    Framed,
    /// A single `\fbox`, title and style ignored
    Plain,
}

/// A boxed call-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    content: String,
    title: Option<String>,
    kind: BoxKind,
    style: BoxStyle,
    options: Vec<(String, String)>,
}

impl TextBox {
    /// Custom box without title or options
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            kind: BoxKind::Custom,
            style: BoxStyle::Tcolorbox,
            options: Vec::new(),
        }
    }

    /// Preset box of the given kind with its default title and colours
    pub fn of_kind(kind: BoxKind, content: impl Into<String>) -> Self {
        let mut textbox = Self::new(content);
        textbox.kind = kind;
        if let Some((title, colour)) = kind.preset() {
            textbox.title = Some(title.to_string());
            textbox.options = vec![
                ("colback".to_string(), format!("{}!5!white", colour)),
                ("colframe".to_string(), format!("{}!75!black", colour)),
            ];
        }
        textbox
    }

    pub fn note(content: impl Into<String>) -> Self {
        Self::of_kind(BoxKind::Note, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::of_kind(BoxKind::Warning, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::of_kind(BoxKind::Info, content)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    /// Set a `tcolorbox` option; re-setting a key replaces its value in place
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.options.push((key, value)),
        }
        self
    }

    pub fn kind(&self) -> BoxKind {
        self.kind
    }

    fn render_tcolorbox(&self) -> String {
        let mut opts: Vec<String> = self
            .options
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if let Some(title) = &self.title {
            opts.push(format!("title={{{}}}", escape_latex(title)));
        }
        let opt_str = if opts.is_empty() {
            String::new()
        } else {
            format!("[{}]", opts.join(", "))
        };
        format!(
            "\\begin{{tcolorbox}}{}\n{}\n\\end{{tcolorbox}}\n",
            opt_str,
            escape_latex(&self.content)
        )
    }

    fn render_framed(&self) -> String {
        let mut output = "\\fbox{\n    \\parbox{0.9\\textwidth}{\n".to_string();
        if let Some(title) = &self.title {
            output.push_str(&format!("        \\textbf{{{}}}\\\\\n", escape_latex(title)));
        }
        output.push_str(&format!("        {}\n", escape_latex(&self.content)));
        output.push_str("    }\n}\n");
        output
    }
}

impl Element for TextBox {
    fn render(&self) -> String {
        if self.content.is_empty() {
            return String::new();
        }
        match self.style {
            BoxStyle::Tcolorbox => self.render_tcolorbox(),
            BoxStyle::Framed => self.render_framed(),
            BoxStyle::Plain => format!(
                "\\fbox{{\\parbox{{0.9\\textwidth}}{{{}}}}}\n",
                escape_latex(&self.content)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_preset() {
        let out = TextBox::note("Check units & signs").render();
        assert_eq!(
            out,
            "\\begin{tcolorbox}[colback=yellow!5!white, colframe=yellow!75!black, title={注意}]\nCheck units \\& signs\n\\end{tcolorbox}\n"
        );
    }

    #[test]
    fn test_custom_box_options_keep_insertion_order() {
        let out = TextBox::new("body")
            .with_option("colback", "white")
            .with_option("arc", "0mm")
            .with_option("colback", "gray!10")
            .with_title("Example")
            .render();
        assert!(out.starts_with("\\begin{tcolorbox}[colback=gray!10, arc=0mm, title={Example}]"));
    }

    #[test]
    fn test_framed_and_plain_styles() {
        let framed = TextBox::warning("Hot").with_style(BoxStyle::Framed).render();
        assert!(framed.contains("\\textbf{警告}\\\\"));
        let plain = TextBox::new("50%").with_style(BoxStyle::Plain).render();
        assert_eq!(plain, "\\fbox{\\parbox{0.9\\textwidth}{50\\%}}\n");
    }

    #[test]
    fn test_empty_content_renders_empty() {
        assert_eq!(TextBox::note("").render(), "");
        assert_eq!(TextBox::new("").with_style(BoxStyle::Framed).render(), "");
        assert_eq!(TextBox::new("").with_style(BoxStyle::Plain).render(), "");
    }

    #[test]
    fn test_preset_titles() {
        assert!(TextBox::info("x").render().contains("title={情報}"));
        assert!(TextBox::warning("x")
            .with_title("Caution")
            .render()
            .contains("title={Caution}"));
    }
}
