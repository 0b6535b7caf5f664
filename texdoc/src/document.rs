//! Finalized document model produced by `build()`
//!
//! A [`Document`] is immutable: it exposes accessors only and is handed to
//! the renderer read-only.

use crate::config::Engine;
use crate::elements::{Element, Heading};
use crate::preamble::{FontSetting, Margins, PackageList};

/// A titled section; its level is metadata, sections never nest
#[derive(Debug)]
pub struct Section {
    heading: Heading,
    children: Vec<Box<dyn Element>>,
}

impl Section {
    pub(crate) fn new(heading: Heading, children: Vec<Box<dyn Element>>) -> Self {
        Self { heading, children }
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    pub fn title(&self) -> &str {
        self.heading.title()
    }

    pub fn level(&self) -> u8 {
        self.heading.level()
    }

    pub fn label(&self) -> Option<&str> {
        self.heading.label()
    }

    pub fn children(&self) -> &[Box<dyn Element>] {
        &self.children
    }

    /// Labels of the heading and every child
    pub fn labels(&self) -> Vec<&str> {
        let mut labels = self.heading.labels();
        labels.extend(self.children.iter().flat_map(|c| c.labels()));
        labels
    }
}

/// One entry of the document's top-level sequence
#[derive(Debug)]
pub enum Block {
    Section(Section),
    Element(Box<dyn Element>),
}

impl Block {
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Block::Section(section) => section.labels(),
            Block::Element(element) => element.labels(),
        }
    }
}

/// Title, author, date and abstract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub date: String,
    pub abstract_text: Option<String>,
    /// Emit the title verbatim instead of escaping it
    pub raw_title: bool,
}

/// `\documentclass` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentClass {
    pub name: String,
    pub options: Option<String>,
}

impl Default for DocumentClass {
    fn default() -> Self {
        Self {
            name: "article".to_string(),
            options: Some("a4paper".to_string()),
        }
    }
}

/// Preamble-level settings gathered by the builder
#[derive(Debug, Clone, PartialEq)]
pub struct PreambleSettings {
    pub class: DocumentClass,
    pub packages: PackageList,
    pub commands: Vec<String>,
    pub font: FontSetting,
    pub margins: Margins,
    pub line_spacing: Option<f32>,
}

impl Default for PreambleSettings {
    fn default() -> Self {
        Self {
            class: DocumentClass::default(),
            packages: PackageList::with_defaults(),
            commands: Vec::new(),
            font: FontSetting::default(),
            margins: Margins::default(),
            line_spacing: None,
        }
    }
}

/// A finalized document
#[derive(Debug)]
pub struct Document {
    pub(crate) metadata: DocumentMetadata,
    pub(crate) preamble: PreambleSettings,
    pub(crate) body: Vec<Block>,
    pub(crate) engine: Engine,
    pub(crate) passes: u32,
}

impl Document {
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn author(&self) -> &str {
        &self.metadata.author
    }

    pub fn date(&self) -> &str {
        &self.metadata.date
    }

    pub fn preamble(&self) -> &PreambleSettings {
        &self.preamble
    }

    pub fn packages(&self) -> &PackageList {
        &self.preamble.packages
    }

    pub fn font(&self) -> &FontSetting {
        &self.preamble.font
    }

    pub fn margins(&self) -> &Margins {
        &self.preamble.margins
    }

    /// Top-level sequence of sections and elements, in order
    pub fn body(&self) -> &[Block] {
        &self.body
    }

    /// Sections in document order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.body.iter().filter_map(|block| match block {
            Block::Section(section) => Some(section),
            Block::Element(_) => None,
        })
    }

    /// Every cross-reference label, in document order
    pub fn labels(&self) -> Vec<&str> {
        self.body.iter().flat_map(|b| b.labels()).collect()
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Number of compile passes requested for this document
    pub fn passes(&self) -> u32 {
        self.passes
    }
}
