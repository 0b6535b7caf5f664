//! Fluent document construction
//!
//! [`DocumentBuilder`] owns the whole construction state. Opening a container
//! hands out a scope builder that owns its parent, so closing a scope gives
//! the parent back:
//!
//! ```
//! use texdoc::prelude::*;
//!
//! let doc = DocumentBuilder::new("T", "A", "D")
//!     .add_section("S1")
//!     .add_text("Hello, 50% done.")
//!     .add_drawing_space("0.7\\textwidth", "5cm")
//!     .add_equation("y = mx + b")
//!     .end_drawing_space()
//!     .end_section()
//!     .build()
//!     .unwrap();
//! assert_eq!(doc.sections().count(), 1);
//! ```
//!
//! Closers only exist on the matching scope type, so closing the wrong
//! container does not compile:
//!
//! ```compile_fail
//! use texdoc::prelude::*;
//!
//! let doc = DocumentBuilder::new("T", "A", "D")
//!     .add_section("S1")
//!     .add_drawing_space("0.7\\textwidth", "5cm")
//!     .end_section()
//!     .build();
//! ```

mod state;

use crate::config::{Engine, Settings};
use crate::document::{Document, DocumentClass, DocumentMetadata};
use crate::elements::{
    Align, Divider, Element, Equation, Heading, Image, ItemList, PageBreak, Paragraph, Table,
    TableOfContents, Text, TextBox, TikzPicture, VerticalSpace,
};
use crate::error::{DocumentError, ScopeKind, UsageError};
use crate::preamble::{BuiltinFont, FontSetting, Margins, Package};
use crate::resources::{FsProvisioner, ResourceProvisioner};
use state::Frame;
use std::path::Path;

pub use state::BuilderState;

mod private {
    pub trait Sealed {}
}

/// Content operations shared by the document root and every open scope
///
/// Each `add_*` appends to the innermost open container and returns the
/// same builder. The trait is sealed; its scope plumbing is not part of the
/// public API.
pub trait ContentScope: private::Sealed + Sized {
    #[doc(hidden)]
    fn state_mut(&mut self) -> &mut BuilderState;

    #[doc(hidden)]
    fn into_state(self) -> BuilderState;

    #[doc(hidden)]
    fn depth(&self) -> usize;

    /// Append any element, including caller-defined ones
    fn add_element(mut self, element: impl Element + 'static) -> Self {
        let depth = self.depth();
        self.state_mut().push_element(depth, Box::new(element));
        self
    }

    /// Append literal text; markup characters are escaped
    fn add_text(self, text: impl Into<String>) -> Self {
        self.add_element(Text::new(text))
    }

    /// Append markup verbatim
    fn add_raw(self, markup: impl Into<String>) -> Self {
        self.add_element(Text::raw(markup))
    }

    fn add_paragraph(self, text: impl Into<String>) -> Self {
        self.add_element(Paragraph::new(text))
    }

    /// Append a bulleted (`ordered == false`) or numbered list
    fn add_list<I, S>(self, items: I, ordered: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_element(ItemList::new(items, ordered))
    }

    /// Append an equation; a plain string becomes a display equation
    fn add_equation(self, equation: impl Into<Equation>) -> Self {
        self.add_element(equation.into())
    }

    fn add_align(self, align: Align) -> Self {
        self.add_element(align)
    }

    /// Provision the image file and append the figure
    ///
    /// Fails immediately when the image cannot be found or copied.
    fn add_image(mut self, mut image: Image) -> Result<Self, DocumentError> {
        let resolved = self.state_mut().provisioner.resolve_image(image.path())?;
        image.set_path(resolved);
        Ok(self.add_element(image))
    }

    fn add_table(self, table: Table) -> Self {
        self.add_element(table)
    }

    fn add_box(self, text_box: TextBox) -> Self {
        self.add_element(text_box)
    }

    fn add_note(self, content: impl Into<String>) -> Self {
        self.add_element(TextBox::note(content))
    }

    fn add_warning(self, content: impl Into<String>) -> Self {
        self.add_element(TextBox::warning(content))
    }

    fn add_info(self, content: impl Into<String>) -> Self {
        self.add_element(TextBox::info(content))
    }

    fn add_tikz(self, picture: TikzPicture) -> Self {
        self.add_element(picture)
    }

    fn add_toc(self) -> Self {
        self.add_element(TableOfContents)
    }

    fn add_divider(self) -> Self {
        self.add_element(Divider)
    }

    fn add_blank_space(self, height: impl Into<String>) -> Self {
        self.add_element(VerticalSpace::new(height))
    }

    fn add_page_break(self) -> Self {
        self.add_element(PageBreak)
    }

    /// Open a drawing space: a content column of `width` beside an empty
    /// right margin of `right_margin`
    fn add_drawing_space(
        mut self,
        width: impl Into<String>,
        right_margin: impl Into<String>,
    ) -> DrawingSpaceBuilder<Self> {
        let parent_depth = self.depth();
        let depth = self.state_mut().open(
            parent_depth,
            Frame::DrawingSpace {
                width: width.into(),
                right_margin: right_margin.into(),
                margin: None,
            },
        );
        DrawingSpaceBuilder {
            parent: self,
            depth,
        }
    }

    /// Open an exercise with a bold title and a prompt line
    fn add_exercise(
        mut self,
        title: impl Into<String>,
        prompt: impl Into<String>,
    ) -> ExerciseBuilder<Self> {
        let parent_depth = self.depth();
        let depth = self.state_mut().open(
            parent_depth,
            Frame::Exercise {
                title: title.into(),
                prompt: prompt.into(),
                items: Vec::new(),
                columns: 1,
            },
        );
        ExerciseBuilder {
            parent: self,
            depth,
        }
    }

    /// Validate the whole graph and produce the finished document
    ///
    /// Fails with [`UsageError::UnclosedScope`] when called with a container
    /// still open.
    fn build(self) -> Result<Document, UsageError> {
        self.into_state().finish()
    }
}

/// Root builder
#[derive(Debug)]
pub struct DocumentBuilder {
    state: BuilderState,
}

impl DocumentBuilder {
    /// Start a document with default settings and the filesystem provisioner
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        let settings = Settings::default();
        let provisioner = FsProvisioner::from_settings(&settings);
        Self::with_settings(title, author, date, &settings, Box::new(provisioner))
    }

    /// Start a document with explicit settings and resource provisioner
    pub fn with_settings(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        settings: &Settings,
        provisioner: Box<dyn ResourceProvisioner>,
    ) -> Self {
        let metadata = DocumentMetadata {
            title: title.into(),
            author: author.into(),
            date: date.into(),
            abstract_text: None,
            raw_title: false,
        };
        Self {
            state: BuilderState::new(metadata, settings, provisioner),
        }
    }

    /// Open a level-1 section; sections exist only at the top level
    pub fn add_section(mut self, title: impl Into<String>) -> SectionBuilder {
        let depth = self.state.open(
            0,
            Frame::Section {
                heading: Heading::new(title, 1),
            },
        );
        SectionBuilder {
            parent: self,
            depth,
        }
    }

    /// Open a `\chapter`; needs a class that defines it, such as `book`
    pub fn add_chapter(mut self, title: impl Into<String>) -> SectionBuilder {
        let depth = self.state.open(
            0,
            Frame::Section {
                heading: Heading::chapter(title),
            },
        );
        SectionBuilder {
            parent: self,
            depth,
        }
    }

    /// Treat the document title as markup (e.g. titles containing math)
    pub fn raw_title(mut self) -> Self {
        self.state.metadata_mut().raw_title = true;
        self
    }

    /// Declare a package; re-declaring a name keeps the first declaration
    pub fn add_package(mut self, name: impl Into<String>) -> Self {
        self.state.preamble.packages.add(Package::new(name));
        self
    }

    pub fn add_package_with_options(
        mut self,
        name: impl Into<String>,
        options: impl Into<String>,
    ) -> Self {
        self.state
            .preamble
            .packages
            .add(Package::with_options(name, options));
        self
    }

    /// Append a raw preamble line (`\newcommand`, `\usetikzlibrary`, ...)
    pub fn add_command(mut self, command: impl Into<String>) -> Self {
        let mut command = command.into();
        if !command.ends_with('\n') {
            command.push('\n');
        }
        self.state.preamble.commands.push(command);
        self
    }

    /// Select a built-in CJK font
    ///
    /// Fails with [`UsageError::ConflictingFonts`] when a font file is set.
    pub fn set_builtin_font(mut self, font: BuiltinFont) -> Result<Self, DocumentError> {
        self.state.set_font(FontSetting::Builtin(font))?;
        Ok(self)
    }

    /// Load a font file through `fontspec`
    ///
    /// The file is provisioned immediately. `name` defaults to the file stem.
    /// Fails with [`UsageError::ConflictingFonts`] when a built-in font is set.
    pub fn set_font_file(
        mut self,
        path: impl AsRef<Path>,
        name: Option<&str>,
    ) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        self.set_font_source(&path.to_string_lossy(), name)
    }

    /// Load a font from a URL through the provisioner
    pub fn set_font_from_url(
        self,
        url: &str,
        name: impl Into<String>,
    ) -> Result<Self, DocumentError> {
        self.set_font_source(url, name.into())
    }

    fn set_font_source(mut self, source: &str, name: String) -> Result<Self, DocumentError> {
        // A rejected call must not provision anything
        self.state.check_font(&FontSetting::File {
            name: name.clone(),
            path: source.into(),
        })?;
        let path = self.state.provisioner.resolve_font(source, &name)?;
        self.state.set_font(FontSetting::File { name, path })?;
        Ok(self)
    }

    /// Set page margins; sides left as `None` keep their current value
    pub fn set_margins(mut self, margins: Margins) -> Self {
        self.state.preamble.margins.merge(margins);
        self
    }

    /// Set the line stretch factor (loads `setspace`)
    pub fn set_line_spacing(mut self, spacing: f32) -> Self {
        self.state.preamble.line_spacing = Some(spacing);
        self
    }

    pub fn set_abstract(mut self, text: impl Into<String>) -> Self {
        self.state.metadata_mut().abstract_text = Some(text.into());
        self
    }

    /// Choose the engine explicitly; disables the automatic switch to
    /// xelatex when a font file is set
    pub fn set_engine(mut self, engine: Engine) -> Self {
        self.state.set_engine(engine);
        self
    }

    /// Number of compile passes; zero is rejected by `build()`
    pub fn set_passes(mut self, passes: u32) -> Self {
        self.state.set_passes(passes);
        self
    }

    pub fn set_document_class(mut self, name: impl Into<String>, options: Option<&str>) -> Self {
        self.state.preamble.class = DocumentClass {
            name: name.into(),
            options: options.map(str::to_string),
        };
        self
    }
}

impl private::Sealed for DocumentBuilder {}

impl ContentScope for DocumentBuilder {
    fn state_mut(&mut self) -> &mut BuilderState {
        &mut self.state
    }

    fn into_state(self) -> BuilderState {
        self.state
    }

    fn depth(&self) -> usize {
        0
    }
}

/// An open section
#[derive(Debug)]
pub struct SectionBuilder {
    parent: DocumentBuilder,
    depth: usize,
}

impl SectionBuilder {
    fn heading_mut(&mut self) -> Option<&mut Heading> {
        match self.parent.state.frame_mut(self.depth) {
            Some(Frame::Section { heading }) => Some(heading),
            _ => None,
        }
    }

    /// Heading level: 1 section, 2 subsection, 3 subsubsection, ...
    pub fn level(mut self, level: u8) -> Self {
        if let Some(heading) = self.heading_mut() {
            heading.set_level(level);
        }
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        if let Some(heading) = self.heading_mut() {
            heading.set_label(label.into());
        }
        self
    }

    /// Render the heading starred (no number)
    pub fn unnumbered(mut self) -> Self {
        if let Some(heading) = self.heading_mut() {
            heading.set_numbered(false);
        }
        self
    }

    /// Treat the title as markup
    pub fn raw_title(mut self) -> Self {
        if let Some(heading) = self.heading_mut() {
            heading.set_raw_title(true);
        }
        self
    }

    /// Close the section and return to the document
    pub fn end_section(mut self) -> DocumentBuilder {
        self.parent.state.close(self.depth, ScopeKind::Section);
        self.parent
    }
}

impl private::Sealed for SectionBuilder {}

impl ContentScope for SectionBuilder {
    fn state_mut(&mut self) -> &mut BuilderState {
        &mut self.parent.state
    }

    fn into_state(self) -> BuilderState {
        self.parent.state
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// An open drawing space inside scope `P`
#[derive(Debug)]
pub struct DrawingSpaceBuilder<P: ContentScope> {
    parent: P,
    depth: usize,
}

impl<P: ContentScope> DrawingSpaceBuilder<P> {
    /// Content placed in the right-hand margin column
    pub fn margin_content(mut self, element: impl Element + 'static) -> Self {
        if let Some(Frame::DrawingSpace { margin, .. }) =
            self.parent.state_mut().frame_mut(self.depth)
        {
            *margin = Some(Box::new(element));
        }
        self
    }

    /// Close the drawing space and return to the enclosing scope
    pub fn end_drawing_space(mut self) -> P {
        self.parent
            .state_mut()
            .close(self.depth, ScopeKind::DrawingSpace);
        self.parent
    }
}

impl<P: ContentScope> private::Sealed for DrawingSpaceBuilder<P> {}

impl<P: ContentScope> ContentScope for DrawingSpaceBuilder<P> {
    fn state_mut(&mut self) -> &mut BuilderState {
        self.parent.state_mut()
    }

    fn into_state(self) -> BuilderState {
        self.parent.into_state()
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// An open exercise inside scope `P`
#[derive(Debug)]
pub struct ExerciseBuilder<P: ContentScope> {
    parent: P,
    depth: usize,
}

impl<P: ContentScope> ExerciseBuilder<P> {
    fn push_item(&mut self, item: Box<dyn Element>) {
        if let Some(Frame::Exercise { items, .. }) = self.parent.state_mut().frame_mut(self.depth) {
            items.push(item);
        }
    }

    /// Lay the problem list out in `columns` columns
    pub fn columns(mut self, columns: u8) -> Self {
        if let Some(Frame::Exercise { columns: c, .. }) =
            self.parent.state_mut().frame_mut(self.depth)
        {
            *c = columns;
        }
        self
    }

    /// Append a text problem
    pub fn add_item(mut self, text: impl Into<String>) -> Self {
        self.push_item(Box::new(Text::new(text)));
        self
    }

    /// Append a problem typeset as inline math
    pub fn add_math_item(mut self, expression: impl Into<String>) -> Self {
        self.push_item(Box::new(Equation::inline(expression)));
        self
    }

    /// Close the exercise and return to the enclosing scope
    pub fn end_exercise(mut self) -> P {
        self.parent.state_mut().close(self.depth, ScopeKind::Exercise);
        self.parent
    }
}

impl<P: ContentScope> private::Sealed for ExerciseBuilder<P> {}

impl<P: ContentScope> ContentScope for ExerciseBuilder<P> {
    fn state_mut(&mut self) -> &mut BuilderState {
        self.parent.state_mut()
    }

    fn into_state(self) -> BuilderState {
        self.parent.into_state()
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use crate::error::ResourceError;
    use std::path::PathBuf;

    /// Provisioner that accepts any path without touching the filesystem
    #[derive(Debug)]
    struct AcceptAll;

    impl ResourceProvisioner for AcceptAll {
        fn resolve_font(&self, source: &str, _name: &str) -> Result<PathBuf, ResourceError> {
            let file = Path::new(source).file_name().unwrap_or_default();
            Ok(Path::new("fonts").join(file))
        }

        fn resolve_image(&self, path: &Path) -> Result<PathBuf, ResourceError> {
            let file = path.file_name().unwrap_or_default();
            Ok(Path::new("images").join(file))
        }
    }

    fn builder() -> DocumentBuilder {
        DocumentBuilder::with_settings("T", "A", "D", &Settings::default(), Box::new(AcceptAll))
    }

    #[test]
    fn test_nested_scopes_close_in_order() {
        let doc = builder()
            .add_section("S1")
            .add_exercise("E1", "Solve")
            .add_drawing_space("0.6\\textwidth", "4cm")
            .add_text("inside")
            .end_drawing_space()
            .add_item("x + 1 = 2")
            .end_exercise()
            .end_section()
            .add_text("after")
            .build()
            .unwrap();

        assert_eq!(doc.body().len(), 2);
        let section = doc.sections().next().unwrap();
        assert_eq!(section.children().len(), 1);
        assert!(matches!(doc.body()[1], Block::Element(_)));
    }

    #[test]
    fn test_build_with_open_scope_names_innermost() {
        let err = builder()
            .add_section("Geometry")
            .add_exercise("Triangles", "")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            UsageError::UnclosedScope {
                kind: ScopeKind::Exercise,
                name: "Triangles".to_string(),
            }
        );
    }

    #[test]
    fn test_section_modifiers() {
        let doc = builder()
            .add_section("Appendix")
            .level(2)
            .label("sec:app")
            .unnumbered()
            .end_section()
            .build()
            .unwrap();
        let section = doc.sections().next().unwrap();
        assert_eq!(section.level(), 2);
        assert_eq!(section.label(), Some("sec:app"));
        assert_eq!(section.heading().render(), "\\subsection*{Appendix}\n\\label{sec:app}\n");
    }

    #[test]
    fn test_chapter_scope() {
        let doc = builder()
            .add_chapter("Part One")
            .label("ch:one")
            .add_text("intro")
            .end_section()
            .add_section("Details")
            .end_section()
            .build()
            .unwrap();
        let mut sections = doc.sections();
        let chapter = sections.next().unwrap();
        assert!(chapter.heading().is_chapter());
        assert_eq!(chapter.level(), 0);
        assert_eq!(chapter.label(), Some("ch:one"));
        assert_eq!(sections.next().unwrap().level(), 1);
    }

    #[test]
    fn test_section_level_zero_rejected() {
        let err = builder().add_section("S").level(0).end_section().build().unwrap_err();
        assert!(matches!(err, UsageError::InvalidHeadingLevel { level: 0, .. }));
    }

    #[test]
    fn test_font_conflict_fails_at_second_call() {
        let result = builder()
            .set_builtin_font(BuiltinFont::Gothic)
            .unwrap()
            .set_font_file("fonts/Noto.ttf", None);
        assert!(matches!(
            result,
            Err(DocumentError::Usage(UsageError::ConflictingFonts { .. }))
        ));

        let result = builder()
            .set_font_file("fonts/Noto.ttf", None)
            .unwrap()
            .set_builtin_font(BuiltinFont::Mincho);
        assert!(matches!(
            result,
            Err(DocumentError::Usage(UsageError::ConflictingFonts { .. }))
        ));
    }

    #[test]
    fn test_same_kind_font_last_write_wins() {
        let doc = builder()
            .set_font_file("a/First.ttf", None)
            .unwrap()
            .set_font_file("b/Second.otf", Some("Second Font"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            doc.font(),
            &FontSetting::File {
                name: "Second Font".to_string(),
                path: PathBuf::from("fonts/Second.otf"),
            }
        );
    }

    #[test]
    fn test_font_file_switches_engine() {
        let doc = builder().set_font_file("Noto.ttf", None).unwrap().build().unwrap();
        assert_eq!(doc.engine(), Engine::Xelatex);

        let doc = builder()
            .set_engine(Engine::Lualatex)
            .set_font_file("Noto.ttf", None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(doc.engine(), Engine::Lualatex);

        let err = builder()
            .set_engine(Engine::Pdflatex)
            .set_font_file("Noto.ttf", None)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, UsageError::EngineFontMismatch { .. }));
    }

    #[test]
    fn test_image_path_is_provisioned() {
        let doc = builder()
            .add_image(Image::new("/tmp/somewhere/plot.png").with_label("fig:plot"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(doc.labels(), vec!["fig:plot"]);
        let Block::Element(image) = &doc.body()[0] else {
            panic!("expected an element");
        };
        assert!(image.render().contains("{images/plot.png}"));
    }

    #[test]
    fn test_element_requirements_follow_caller_packages() {
        let doc = builder()
            .add_package("siunitx")
            .add_tikz(TikzPicture::new("\\draw (0,0) -- (1,1);").with_library("arrows.meta"))
            .add_exercise("E", "")
            .columns(2)
            .add_math_item("1+1")
            .add_math_item("2+2")
            .end_exercise()
            .build()
            .unwrap();
        let names: Vec<&str> = doc.packages().iter().map(|p| p.name.as_str()).collect();
        let tail = &names[names.len() - 3..];
        assert_eq!(tail, ["siunitx", "tikz", "multicol"]);
        assert_eq!(doc.preamble().commands, vec!["\\usetikzlibrary{arrows.meta}\n"]);
    }

    #[test]
    fn test_zero_passes_rejected() {
        let err = builder().set_passes(0).build().unwrap_err();
        assert_eq!(err, UsageError::InvalidPasses);
    }

    #[test]
    fn test_margin_content_and_merge() {
        let doc = builder()
            .set_margins(Margins::uniform("2cm"))
            .set_margins(Margins {
                left: Some("3cm".to_string()),
                ..Default::default()
            })
            .add_drawing_space("0.7\\textwidth", "5cm")
            .margin_content(Text::new("notes"))
            .end_drawing_space()
            .build()
            .unwrap();
        assert_eq!(doc.margins().top.as_deref(), Some("2cm"));
        assert_eq!(doc.margins().left.as_deref(), Some("3cm"));
        let Block::Element(space) = &doc.body()[0] else {
            panic!("expected an element");
        };
        assert!(space.render().contains("{5cm}\nnotes\n\\end{minipage}"));
    }
}
