//! Error types for document construction and rendering

use std::path::PathBuf;
use thiserror::Error;

/// Kind of container scope tracked by the builder stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Document top level
    Root,
    /// A section opened with `add_section`
    Section,
    /// A drawing space opened with `add_drawing_space`
    DrawingSpace,
    /// An exercise opened with `add_exercise`
    Exercise,
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "document"),
            Self::Section => write!(f, "section"),
            Self::DrawingSpace => write!(f, "drawing-space"),
            Self::Exercise => write!(f, "exercise"),
        }
    }
}

/// Programmer errors detected while building or rendering a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `build()` was called while a container was still open
    #[error("unclosed {kind} '{name}': call the matching end_ operation before build()")]
    UnclosedScope {
        /// Kind of the innermost open scope
        kind: ScopeKind,
        /// Title or description of the open scope
        name: String,
    },

    /// A closer did not match the scope on top of the stack
    #[error("cannot close {expected}: the innermost open scope is {found}")]
    MismatchedScope {
        /// Scope the closer expected to pop
        expected: ScopeKind,
        /// Scope actually on top of the stack
        found: ScopeKind,
    },

    /// The same cross-reference label was used more than once
    #[error("duplicate label '{label}'")]
    DuplicateLabel {
        /// The colliding label
        label: String,
    },

    /// A built-in font and a font file were both requested
    #[error("cannot set {requested}: {current} is already set")]
    ConflictingFonts {
        /// Description of the font setting already in place
        current: String,
        /// Description of the rejected font setting
        requested: String,
    },

    /// A font file requires a Unicode-aware engine
    #[error("engine '{engine}' cannot load font files; use xelatex or lualatex")]
    EngineFontMismatch {
        /// The configured engine
        engine: String,
    },

    /// Section or heading level below 1
    #[error("heading '{title}' has invalid level {level} (levels start at 1)")]
    InvalidHeadingLevel {
        /// Heading title
        title: String,
        /// The rejected level
        level: u8,
    },

    /// A table row does not match the header width
    #[error("table '{table}' row {row} has {found} cells, expected {expected}")]
    RaggedTableRow {
        /// Caption or label identifying the table
        table: String,
        /// Zero-based row index
        row: usize,
        /// Header column count
        expected: usize,
        /// Cells found in the row
        found: usize,
    },

    /// An exercise was configured with zero columns
    #[error("exercise '{exercise}' must have at least one column")]
    InvalidColumns {
        /// Exercise title
        exercise: String,
    },

    /// Compile pass count of zero
    #[error("compile passes must be at least 1")]
    InvalidPasses,
}

/// Errors raised when a font or image cannot be provisioned
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Resource does not exist or cannot be fetched
    #[error("{kind} not found: {path}")]
    NotFound {
        /// "font" or "image"
        kind: &'static str,
        /// The requested path or URL
        path: String,
    },

    /// Copying the resource into the output tree failed
    #[error("failed to provision {path}: {source}")]
    Io {
        /// The path being provisioned
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by builder operations
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_offending_identifier() {
        let err = UsageError::DuplicateLabel {
            label: "fig:1".to_string(),
        };
        assert!(err.to_string().contains("fig:1"));

        let err = UsageError::UnclosedScope {
            kind: ScopeKind::DrawingSpace,
            name: "0.7\\textwidth".to_string(),
        };
        assert!(err.to_string().contains("drawing-space"));

        let err = ResourceError::NotFound {
            kind: "image",
            path: "missing.png".to_string(),
        };
        assert_eq!(err.to_string(), "image not found: missing.png");
    }
}
