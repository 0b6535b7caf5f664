//! Figures: included images and TikZ drawings

use super::{push_label, Element};
use crate::escape::{escape_latex, format_ratio};
use crate::preamble::Package;
use std::path::{Path, PathBuf};

/// An included graphic inside a `figure` float
///
/// The path is replaced by the provisioned path when the image is added
/// through the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    path: PathBuf,
    caption: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    label: Option<String>,
    placement: String,
}

impl Image {
    /// Image at 80% of the text width, placed `h`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
            width: Some(0.8),
            height: None,
            label: None,
            placement: "h".to_string(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Width as a fraction of `\textwidth`
    pub fn with_width(mut self, ratio: f32) -> Self {
        self.width = Some(ratio);
        self
    }

    /// Height as a fraction of `\textheight`
    pub fn with_height(mut self, ratio: f32) -> Self {
        self.height = Some(ratio);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Float placement specifier (`h`, `htbp`, ...)
    pub fn with_placement(mut self, placement: impl Into<String>) -> Self {
        self.placement = placement.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }
}

impl Element for Image {
    fn render(&self) -> String {
        let mut output = format!("\\begin{{figure}}[{}]\n", self.placement);
        output.push_str("    \\centering\n");

        let mut opts = Vec::new();
        if let Some(width) = self.width {
            opts.push(format!("width={}\\textwidth", format_ratio(width)));
        }
        if let Some(height) = self.height {
            opts.push(format!("height={}\\textheight", format_ratio(height)));
        }
        let opt_str = if opts.is_empty() {
            String::new()
        } else {
            format!("[{}]", opts.join(", "))
        };
        output.push_str(&format!(
            "    \\includegraphics{}{{{}}}\n",
            opt_str,
            self.path.display().to_string().replace('\\', "/")
        ));

        if let Some(caption) = &self.caption {
            output.push_str(&format!("    \\caption{{{}}}\n", escape_latex(caption)));
        }
        push_label(&mut output, "    ", self.label.as_deref());
        output.push_str("\\end{figure}\n");
        output
    }

    fn labels(&self) -> Vec<&str> {
        self.label.as_deref().into_iter().collect()
    }
}

/// A TikZ drawing, floated in a figure unless inline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TikzPicture {
    code: String,
    caption: Option<String>,
    label: Option<String>,
    libraries: Vec<String>,
    inline: bool,
}

impl TikzPicture {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            caption: None,
            label: None,
            libraries: Vec::new(),
            inline: false,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Require a TikZ library (`arrows`, `calc`, ...)
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.libraries.push(library.into());
        self
    }

    /// Render the bare `tikzpicture` without a figure float
    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

impl Element for TikzPicture {
    fn render(&self) -> String {
        let picture = format!(
            "\\begin{{tikzpicture}}\n{}\n\\end{{tikzpicture}}",
            self.code.trim()
        );
        if self.inline {
            return picture;
        }
        let mut output = "\\begin{figure}[h]\n    \\centering\n".to_string();
        output.push_str(&picture);
        output.push('\n');
        if let Some(caption) = &self.caption {
            output.push_str(&format!("    \\caption{{{}}}\n", escape_latex(caption)));
        }
        push_label(&mut output, "    ", self.label.as_deref());
        output.push_str("\\end{figure}\n");
        output
    }

    fn labels(&self) -> Vec<&str> {
        self.label.as_deref().into_iter().collect()
    }

    fn required_packages(&self) -> Vec<Package> {
        vec![Package::new("tikz")]
    }

    fn preamble_commands(&self) -> Vec<String> {
        self.libraries
            .iter()
            .map(|lib| format!("\\usetikzlibrary{{{}}}\n", lib))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_defaults() {
        let out = Image::new("images/plot.png").render();
        assert_eq!(
            out,
            "\\begin{figure}[h]\n    \\centering\n    \\includegraphics[width=0.8\\textwidth]{images/plot.png}\n\\end{figure}\n"
        );
    }

    #[test]
    fn test_image_caption_and_label() {
        let out = Image::new("a.png")
            .with_caption("Growth of x_1")
            .with_width(0.5)
            .with_height(0.3)
            .with_label("fig:1")
            .render();
        assert!(out.contains("[width=0.5\\textwidth, height=0.3\\textheight]"));
        assert!(out.contains("\\caption{Growth of x\\_1}"));
        assert!(out.contains("\\label{fig:1}"));
    }

    #[test]
    fn test_tikz_requirements() {
        let pic = TikzPicture::new("\\draw (0,0) -- (1,1);")
            .with_library("arrows")
            .with_label("fig:line");
        assert_eq!(pic.required_packages(), vec![Package::new("tikz")]);
        assert_eq!(pic.preamble_commands(), vec!["\\usetikzlibrary{arrows}\n"]);
        assert!(pic.render().starts_with("\\begin{figure}[h]"));
    }

    #[test]
    fn test_inline_tikz_has_no_float() {
        let out = TikzPicture::new("\\fill (0,0) circle (2pt);").inline().render();
        assert_eq!(
            out,
            "\\begin{tikzpicture}\n\\fill (0,0) circle (2pt);\n\\end{tikzpicture}"
        );
    }
}
