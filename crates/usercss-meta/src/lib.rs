//! Metadata parser for usercss styles.
//!
//! This crate reads the `==UserStyle==` comment at the top of a usercss file:
//!
//! - **Extraction**: find the metadata block and its offset in the source
//! - **Directives**: `@name`, `@version`, URL keys and friends, with validation
//! - **Variables**: `@var`/`@advanced` declarations of seven types
//! - **Versions**: relaxed semver normalization and ordering
//! - **Stringify**: render parsed metadata back into a comment
//!
//! Error positions are byte offsets into the source after line ending
//! normalization, so an editor can place its cursor on the failure.
//!
//! # Example
//!
//! ```
//! use usercss_meta::prelude::*;
//!
//! let source = "/* ==UserStyle==
//! @name        Dark
//! @namespace   example.com
//! @version     1.0.0
//! @var color bg \"Background\" #222
//! ==/UserStyle== */";
//!
//! let data = parse_meta(source)?;
//! assert_eq!(data.name(), Some("Dark"));
//! assert_eq!(data.vars["bg"].effective_value(), "rgb(34, 34, 34)");
//! # Ok::<(), usercss_meta::ParseError>(())
//! ```

pub mod color;
pub mod metadata;
pub mod scanner;
pub mod stringify;
pub mod validate;
pub mod vars;
pub mod version;

mod error;

pub use error::{ParseError, ParseErrorKind, Result};
pub use metadata::{
    Directive, MetaKey, MetaParser, MetaSource, ParsedMeta, ParserOptions, UnknownKeyPolicy,
    UsercssData, find_meta_source, normalize_line_endings, parse_meta,
};
pub use stringify::{StringifyFormat, StringifyOptions, stringify};
pub use validate::{MANDATORY_KEYS, PREPROCESSORS, validate_style};
pub use version::{compare_version, normalize_version};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::metadata::{MetaParser, ParsedMeta, ParserOptions, UnknownKeyPolicy, UsercssData, parse_meta};
    pub use crate::vars::{Checked, RangeSpec, VarDef, VarKind, VarOption, VarValue, validate_var};
    pub use crate::version::{compare_version, normalize_version};
    pub use crate::{ParseError, ParseErrorKind};
}
