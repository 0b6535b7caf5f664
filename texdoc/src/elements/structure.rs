//! Structural elements: headings, table of contents and container elements

use super::{
    child_commands, child_labels, child_packages, push_label, render_children,
    validate_children, Element,
};
use crate::error::UsageError;
use crate::escape::escape_latex;
use crate::preamble::Package;

/// A section heading; level is metadata, not nesting
///
/// Chapters sit at level 0 and need a class with `\chapter` (`book`, `report`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    title: String,
    level: u8,
    label: Option<String>,
    numbered: bool,
    raw_title: bool,
    chapter: bool,
}

impl Heading {
    pub fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            level,
            label: None,
            numbered: true,
            raw_title: false,
            chapter: false,
        }
    }

    /// A `\chapter` heading
    pub fn chapter(title: impl Into<String>) -> Self {
        Self {
            chapter: true,
            ..Self::new(title, 0)
        }
    }

    pub fn is_chapter(&self) -> bool {
        self.chapter
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn unnumbered(mut self) -> Self {
        self.numbered = false;
        self
    }

    /// Treat the title as LaTeX markup (e.g. titles containing math)
    pub fn raw_title(mut self) -> Self {
        self.raw_title = true;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// An explicit level turns a chapter into an ordinary heading
    pub(crate) fn set_level(&mut self, level: u8) {
        self.level = level;
        self.chapter = false;
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = Some(label);
    }

    pub(crate) fn set_numbered(&mut self, numbered: bool) {
        self.numbered = numbered;
    }

    pub(crate) fn set_raw_title(&mut self, raw: bool) {
        self.raw_title = raw;
    }

    fn command(&self) -> &'static str {
        if self.chapter {
            return "chapter";
        }
        match self.level {
            2 => "subsection",
            3 => "subsubsection",
            4 => "paragraph",
            5 => "subparagraph",
            _ => "section",
        }
    }
}

impl Element for Heading {
    fn render(&self) -> String {
        let star = if self.numbered { "" } else { "*" };
        let title = if self.raw_title {
            self.title.clone()
        } else {
            escape_latex(&self.title)
        };
        let mut output = format!("\\{}{}{{{}}}\n", self.command(), star, title);
        push_label(&mut output, "", self.label.as_deref());
        output
    }

    fn labels(&self) -> Vec<&str> {
        self.label.as_deref().into_iter().collect()
    }

    fn validate(&self) -> Result<(), UsageError> {
        if self.level == 0 && !self.chapter {
            return Err(UsageError::InvalidHeadingLevel {
                title: self.title.clone(),
                level: self.level,
            });
        }
        Ok(())
    }
}

/// `\tableofcontents` followed by a page break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableOfContents;

impl Element for TableOfContents {
    fn render(&self) -> String {
        "\\tableofcontents\n\\newpage\n".to_string()
    }
}

/// `\newpage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageBreak;

impl Element for PageBreak {
    fn render(&self) -> String {
        "\\newpage\n".to_string()
    }
}

/// Narrowed content column with blank room on the right for handwriting
///
/// Built by `add_drawing_space` / `end_drawing_space`; children are frozen
/// when the scope closes.
#[derive(Debug)]
pub struct DrawingSpace {
    width: String,
    right_margin: String,
    children: Vec<Box<dyn Element>>,
    margin_content: Option<Box<dyn Element>>,
}

impl DrawingSpace {
    pub(crate) fn new(
        width: String,
        right_margin: String,
        children: Vec<Box<dyn Element>>,
        margin_content: Option<Box<dyn Element>>,
    ) -> Self {
        Self {
            width,
            right_margin,
            children,
            margin_content,
        }
    }

    pub fn width(&self) -> &str {
        &self.width
    }

    pub fn right_margin(&self) -> &str {
        &self.right_margin
    }

    pub fn children(&self) -> &[Box<dyn Element>] {
        &self.children
    }
}

impl Element for DrawingSpace {
    fn render(&self) -> String {
        let mut output = format!("\\noindent\n\\begin{{minipage}}[t]{{{}}}\n", self.width);
        output.push_str(&render_children(&self.children));
        output.push_str("\\end{minipage}%\n\\hfill\n");
        output.push_str(&format!("\\begin{{minipage}}[t]{{{}}}\n", self.right_margin));
        if let Some(margin) = &self.margin_content {
            output.push_str(&margin.render());
            output.push('\n');
        }
        output.push_str("\\end{minipage}\n\\par\n");
        output
    }

    fn labels(&self) -> Vec<&str> {
        let mut labels = child_labels(&self.children);
        if let Some(margin) = &self.margin_content {
            labels.extend(margin.labels());
        }
        labels
    }

    fn required_packages(&self) -> Vec<Package> {
        let mut packages = child_packages(&self.children);
        if let Some(margin) = &self.margin_content {
            packages.extend(margin.required_packages());
        }
        packages
    }

    fn preamble_commands(&self) -> Vec<String> {
        let mut commands = child_commands(&self.children);
        if let Some(margin) = &self.margin_content {
            commands.extend(margin.preamble_commands());
        }
        commands
    }

    fn validate(&self) -> Result<(), UsageError> {
        validate_children(&self.children)?;
        match &self.margin_content {
            Some(margin) => margin.validate(),
            None => Ok(()),
        }
    }
}

/// A titled exercise: prompt, free content and a numbered problem list
#[derive(Debug)]
pub struct Exercise {
    title: String,
    prompt: String,
    items: Vec<Box<dyn Element>>,
    columns: u8,
    children: Vec<Box<dyn Element>>,
}

impl Exercise {
    pub(crate) fn new(
        title: String,
        prompt: String,
        items: Vec<Box<dyn Element>>,
        columns: u8,
        children: Vec<Box<dyn Element>>,
    ) -> Self {
        Self {
            title,
            prompt,
            items,
            columns,
            children,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl Element for Exercise {
    fn render(&self) -> String {
        let mut output = String::new();
        if !self.title.is_empty() {
            output.push_str(&format!("\\noindent\\textbf{{{}}}\\par\n", escape_latex(&self.title)));
        }
        if !self.prompt.is_empty() {
            output.push_str(&format!("{}\\par\n", escape_latex(&self.prompt)));
        }
        output.push_str(&render_children(&self.children));

        if self.items.is_empty() {
            return output;
        }
        let multicol = self.columns > 1;
        if multicol {
            output.push_str(&format!("\\begin{{multicols}}{{{}}}\n", self.columns));
        }
        output.push_str("\\begin{enumerate}\n");
        for item in &self.items {
            output.push_str(&format!("    \\item {}\n", item.render()));
        }
        output.push_str("\\end{enumerate}\n");
        if multicol {
            output.push_str("\\end{multicols}\n");
        }
        output
    }

    fn labels(&self) -> Vec<&str> {
        let mut labels = child_labels(&self.children);
        labels.extend(child_labels(&self.items));
        labels
    }

    fn required_packages(&self) -> Vec<Package> {
        let mut packages = child_packages(&self.children);
        if self.columns > 1 && !self.items.is_empty() {
            packages.push(Package::new("multicol"));
        }
        packages
    }

    fn preamble_commands(&self) -> Vec<String> {
        child_commands(&self.children)
    }

    fn validate(&self) -> Result<(), UsageError> {
        if self.columns == 0 {
            return Err(UsageError::InvalidColumns {
                exercise: self.title.clone(),
            });
        }
        validate_children(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Equation, Text};

    #[test]
    fn test_heading_levels() {
        assert_eq!(Heading::new("Intro", 1).render(), "\\section{Intro}\n");
        assert_eq!(Heading::new("Deep", 3).render(), "\\subsubsection{Deep}\n");
        assert_eq!(Heading::new("Beyond", 9).render(), "\\section{Beyond}\n");
        let starred = Heading::new("Q&A", 2).unnumbered().with_label("sec:qa");
        assert_eq!(starred.render(), "\\subsection*{Q\\&A}\n\\label{sec:qa}\n");
    }

    #[test]
    fn test_heading_level_zero_rejected() {
        assert!(matches!(
            Heading::new("Zero", 0).validate(),
            Err(UsageError::InvalidHeadingLevel { level: 0, .. })
        ));
    }

    #[test]
    fn test_chapter_heading() {
        let chapter = Heading::chapter("Basics").with_label("ch:basics");
        assert!(chapter.validate().is_ok());
        assert_eq!(chapter.render(), "\\chapter{Basics}\n\\label{ch:basics}\n");
        assert_eq!(Heading::chapter("Notes").unnumbered().render(), "\\chapter*{Notes}\n");
    }

    #[test]
    fn test_raw_heading_title() {
        let heading = Heading::new("What is $f(x)$?", 1).raw_title();
        assert_eq!(heading.render(), "\\section{What is $f(x)$?}\n");
    }

    #[test]
    fn test_drawing_space_layout() {
        let space = DrawingSpace::new(
            "0.7\\textwidth".to_string(),
            "5cm".to_string(),
            vec![Box::new(Text::new("Sketch it"))],
            None,
        );
        assert_eq!(
            space.render(),
            "\\noindent\n\\begin{minipage}[t]{0.7\\textwidth}\nSketch it\n\\end{minipage}%\n\\hfill\n\\begin{minipage}[t]{5cm}\n\\end{minipage}\n\\par\n"
        );
    }

    #[test]
    fn test_exercise_multicolumn_items() {
        let exercise = Exercise::new(
            "Drill 1".to_string(),
            "Solve for x.".to_string(),
            vec![
                Box::new(Equation::inline("2x + 1 = 5")),
                Box::new(Equation::inline("3x = 9")),
            ],
            2,
            Vec::new(),
        );
        let out = exercise.render();
        assert!(out.starts_with("\\noindent\\textbf{Drill 1}\\par\nSolve for x.\\par\n"));
        assert!(out.contains("\\begin{multicols}{2}\n\\begin{enumerate}\n    \\item $2x + 1 = 5$\n"));
        assert_eq!(exercise.required_packages(), vec![Package::new("multicol")]);
    }

    #[test]
    fn test_exercise_zero_columns_rejected() {
        let exercise = Exercise::new("E".to_string(), String::new(), Vec::new(), 0, Vec::new());
        assert!(matches!(
            exercise.validate(),
            Err(UsageError::InvalidColumns { .. })
        ));
    }
}
