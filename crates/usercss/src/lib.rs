//! Building installable styles from usercss source.
//!
//! This crate takes a usercss file from source text to sections a browser
//! can apply:
//!
//! - **Metadata**: [`build_meta`] parses the `==UserStyle==` block into a [`Style`]
//! - **Preprocessing**: plain CSS, `uso` placeholders, or a registered Stylus/Less engine
//! - **Sections**: [`MozDocumentSplitter`] turns `@-moz-document` blocks into [`Section`]s
//! - **Updates**: [`Style::rebuild_meta`] and [`assign_vars`] keep user customizations
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use usercss::prelude::*;
//!
//! let style = build_meta(&source)?;
//! let compiler = Compiler::new(Arc::new(MozDocumentSplitter::new()));
//! let built = compiler.build_code(style, false).await?;
//! for section in &built.style.sections {
//!     println!("{:?}: {}", section.domains, section.code);
//! }
//! ```

pub mod compiler;
pub mod preprocess;
pub mod reconcile;
pub mod sections;
pub mod style;

mod error;

pub use compiler::{BuildOutput, CompileOptions, Compiler, strip_meta};
pub use error::{Error, Result};
pub use preprocess::{Preprocessor, PreprocessorEngine, PreprocessorError};
pub use reconcile::assign_vars;
pub use sections::{
    MozDocumentSplitter, Section, SectionSplitter, SplitError, SplitOutput, SplitRequest,
    SplitterQueue,
};
pub use style::{Style, build_meta};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::compiler::{BuildOutput, CompileOptions, Compiler};
    pub use crate::preprocess::{Preprocessor, PreprocessorEngine, PreprocessorError};
    pub use crate::reconcile::assign_vars;
    pub use crate::sections::{MozDocumentSplitter, Section, SectionSplitter, SplitOutput, SplitRequest};
    pub use crate::style::{Style, build_meta};
    pub use crate::{Error, Result};
    pub use usercss_meta::prelude::*;
}
