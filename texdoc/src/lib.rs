//! texdoc - LaTeX document builder
//!
//! Build a document with a fluent API, render it to LaTeX markup and compile
//! it to PDF with an external engine.
//!
//! ```
//! use texdoc::prelude::*;
//!
//! let doc = DocumentBuilder::new("T", "A", "D")
//!     .add_section("S1")
//!     .add_text("Hello, 50% done.")
//!     .end_section()
//!     .build()
//!     .unwrap();
//! let tex = texdoc::render(&doc).unwrap();
//! assert!(tex.contains("\\section{S1}\n\nHello, 50\\% done.\n"));
//! ```

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]

pub mod builder;
pub mod compiler;
pub mod config;
pub mod document;
pub mod elements;
pub mod error;
pub mod escape;
pub mod generator;
pub mod preamble;
pub mod renderer;
pub mod resources;

pub use builder::{ContentScope, DocumentBuilder};
pub use document::Document;
pub use error::{DocumentError, ResourceError, UsageError};
pub use renderer::render;

/// Everything needed to build and render a document
pub mod prelude {
    pub use crate::builder::{
        ContentScope, DocumentBuilder, DrawingSpaceBuilder, ExerciseBuilder, SectionBuilder,
    };
    pub use crate::config::{Engine, Settings};
    pub use crate::document::Document;
    pub use crate::elements::{
        Align, BoxKind, BoxStyle, Element, Equation, Image, Table, TextBox, TikzPicture,
    };
    pub use crate::error::{DocumentError, UsageError};
    pub use crate::preamble::{BuiltinFont, Margins};
}
