//! Scope stack and finalization shared by every builder type

use crate::config::{Engine, Settings};
use crate::document::{Block, Document, DocumentMetadata, PreambleSettings, Section};
use crate::elements::{DrawingSpace, Element, Exercise, Heading};
use crate::error::{ScopeKind, UsageError};
use crate::preamble::{FontSetting, Package};
use crate::resources::ResourceProvisioner;
use itertools::Itertools;

/// Payload of an open container
#[derive(Debug)]
pub(crate) enum Frame {
    Section {
        heading: Heading,
    },
    DrawingSpace {
        width: String,
        right_margin: String,
        margin: Option<Box<dyn Element>>,
    },
    Exercise {
        title: String,
        prompt: String,
        items: Vec<Box<dyn Element>>,
        columns: u8,
    },
}

impl Frame {
    fn kind(&self) -> ScopeKind {
        match self {
            Frame::Section { .. } => ScopeKind::Section,
            Frame::DrawingSpace { .. } => ScopeKind::DrawingSpace,
            Frame::Exercise { .. } => ScopeKind::Exercise,
        }
    }

    fn name(&self) -> String {
        match self {
            Frame::Section { heading } => heading.title().to_string(),
            Frame::DrawingSpace {
                width,
                right_margin,
                ..
            } => format!("width {}, right margin {}", width, right_margin),
            Frame::Exercise { title, .. } => title.clone(),
        }
    }
}

/// An open container and the children appended to it so far
#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) frame: Frame,
    children: Vec<Box<dyn Element>>,
}

/// Mutable construction state owned by the root builder
///
/// Depth 0 is the document root; `stack[i]` is the scope at depth `i + 1`.
/// Scope builders remember their depth and every operation re-checks that
/// it still addresses the top of the stack.
#[derive(Debug)]
pub struct BuilderState {
    metadata: DocumentMetadata,
    pub(crate) preamble: PreambleSettings,
    body: Vec<Block>,
    stack: Vec<Scope>,
    engine: Engine,
    engine_explicit: bool,
    passes: u32,
    pub(crate) provisioner: Box<dyn ResourceProvisioner>,
    poisoned: Option<UsageError>,
}

impl BuilderState {
    pub(crate) fn new(
        metadata: DocumentMetadata,
        settings: &Settings,
        provisioner: Box<dyn ResourceProvisioner>,
    ) -> Self {
        Self {
            metadata,
            preamble: PreambleSettings::default(),
            body: Vec::new(),
            stack: Vec::new(),
            engine: settings.compilation.engine,
            engine_explicit: false,
            passes: settings.compilation.compile_times,
            provisioner,
            poisoned: None,
        }
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut DocumentMetadata {
        &mut self.metadata
    }

    pub(crate) fn set_engine(&mut self, engine: Engine) {
        self.engine = engine;
        self.engine_explicit = true;
    }

    pub(crate) fn set_passes(&mut self, passes: u32) {
        self.passes = passes;
    }

    /// Record the first usage error; later operations keep going so the
    /// chain stays fluent and `build()` reports it
    fn poison(&mut self, err: UsageError) {
        log::debug!("Builder poisoned: {}", err);
        if self.poisoned.is_none() {
            self.poisoned = Some(err);
        }
    }

    fn top_kind(&self) -> ScopeKind {
        self.stack
            .last()
            .map(|s| s.frame.kind())
            .unwrap_or(ScopeKind::Root)
    }

    fn kind_at(&self, depth: usize) -> ScopeKind {
        match depth {
            0 => ScopeKind::Root,
            d => self
                .stack
                .get(d - 1)
                .map(|s| s.frame.kind())
                .unwrap_or(ScopeKind::Root),
        }
    }

    /// Append an element to the scope at `depth`
    pub(crate) fn push_element(&mut self, depth: usize, element: Box<dyn Element>) {
        if depth != self.stack.len() {
            let err = UsageError::MismatchedScope {
                expected: self.kind_at(depth),
                found: self.top_kind(),
            };
            self.poison(err);
            return;
        }
        match self.stack.last_mut() {
            Some(scope) => scope.children.push(element),
            None => self.body.push(Block::Element(element)),
        }
    }

    /// Push a new scope and return its depth
    pub(crate) fn open(&mut self, parent_depth: usize, frame: Frame) -> usize {
        if parent_depth != self.stack.len() {
            let err = UsageError::MismatchedScope {
                expected: self.kind_at(parent_depth),
                found: self.top_kind(),
            };
            self.poison(err);
        }
        log::debug!("Opening {} '{}'", frame.kind(), frame.name());
        self.stack.push(Scope {
            frame,
            children: Vec::new(),
        });
        self.stack.len()
    }

    /// Frame of the scope at `depth`, if it is the innermost open scope
    pub(crate) fn frame_mut(&mut self, depth: usize) -> Option<&mut Frame> {
        if depth == 0 || depth != self.stack.len() {
            return None;
        }
        self.stack.last_mut().map(|s| &mut s.frame)
    }

    /// Pop the scope at `depth`, checking it is a `expected` scope, and
    /// append the finished container to its parent
    pub(crate) fn close(&mut self, depth: usize, expected: ScopeKind) {
        let found = self.top_kind();
        if depth != self.stack.len() || found != expected {
            self.poison(UsageError::MismatchedScope { expected, found });
            return;
        }
        let Some(scope) = self.stack.pop() else {
            return;
        };
        log::debug!("Closing {} '{}'", expected, scope.frame.name());

        match scope.frame {
            Frame::Section { heading } => {
                if !self.stack.is_empty() {
                    self.poison(UsageError::MismatchedScope {
                        expected: ScopeKind::Root,
                        found: self.top_kind(),
                    });
                    return;
                }
                self.body
                    .push(Block::Section(Section::new(heading, scope.children)));
            }
            Frame::DrawingSpace {
                width,
                right_margin,
                margin,
            } => {
                let element = DrawingSpace::new(width, right_margin, scope.children, margin);
                self.push_element(depth - 1, Box::new(element));
            }
            Frame::Exercise {
                title,
                prompt,
                items,
                columns,
            } => {
                let element = Exercise::new(title, prompt, items, columns, scope.children);
                self.push_element(depth - 1, Box::new(element));
            }
        }
    }

    /// Reject switching between a built-in font and a font file
    pub(crate) fn check_font(&self, requested: &FontSetting) -> Result<(), UsageError> {
        let current = &self.preamble.font;
        let conflict = matches!(
            (current, requested),
            (FontSetting::Builtin(_), FontSetting::File { .. })
                | (FontSetting::File { .. }, FontSetting::Builtin(_))
        );
        if conflict {
            return Err(UsageError::ConflictingFonts {
                current: current.describe(),
                requested: requested.describe(),
            });
        }
        Ok(())
    }

    /// Replace the font setting; same-kind settings overwrite
    pub(crate) fn set_font(&mut self, font: FontSetting) -> Result<(), UsageError> {
        self.check_font(&font)?;
        log::debug!("Font set to {}", font.describe());
        self.preamble.font = font;
        Ok(())
    }

    /// Validate the whole graph and produce the immutable document
    pub(crate) fn finish(mut self) -> Result<Document, UsageError> {
        if let Some(err) = self.poisoned.take() {
            return Err(err);
        }
        if let Some(scope) = self.stack.last() {
            return Err(UsageError::UnclosedScope {
                kind: scope.frame.kind(),
                name: scope.frame.name(),
            });
        }
        if self.passes == 0 {
            return Err(UsageError::InvalidPasses);
        }

        for block in &self.body {
            match block {
                Block::Section(section) => {
                    section.heading().validate()?;
                    section.children().iter().try_for_each(|c| c.validate())?;
                }
                Block::Element(element) => element.validate()?,
            }
        }

        if let Some(label) = self
            .body
            .iter()
            .flat_map(|b| b.labels())
            .duplicates()
            .next()
        {
            return Err(UsageError::DuplicateLabel {
                label: label.to_string(),
            });
        }

        let engine = self.resolve_engine()?;
        self.collect_requirements();

        Ok(Document {
            metadata: self.metadata,
            preamble: self.preamble,
            body: self.body,
            engine,
            passes: self.passes,
        })
    }

    /// Font files need xelatex or lualatex; switch unless the caller chose pdflatex
    fn resolve_engine(&self) -> Result<Engine, UsageError> {
        if !self.preamble.font.is_file() || self.engine.supports_font_files() {
            return Ok(self.engine);
        }
        if self.engine_explicit {
            return Err(UsageError::EngineFontMismatch {
                engine: self.engine.to_string(),
            });
        }
        log::info!(
            "Font file configured; switching engine from {} to {}",
            self.engine,
            Engine::Xelatex
        );
        Ok(Engine::Xelatex)
    }

    /// Append packages and preamble lines required by elements, in first-use order
    fn collect_requirements(&mut self) {
        let mut packages: Vec<Package> = Vec::new();
        let mut commands: Vec<String> = Vec::new();
        for block in &self.body {
            let elements: Vec<&dyn Element> = match block {
                Block::Section(section) => section.children().iter().map(|c| c.as_ref()).collect(),
                Block::Element(element) => vec![element.as_ref()],
            };
            for element in elements {
                packages.extend(element.required_packages());
                commands.extend(element.preamble_commands());
            }
        }
        for package in packages {
            self.preamble.packages.add(package);
        }
        for command in commands {
            if !self.preamble.commands.contains(&command) {
                self.preamble.commands.push(command);
            }
        }
    }
}
