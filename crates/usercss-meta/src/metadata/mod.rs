//! Metadata block extraction and parsing.

mod directive;
mod extract;
mod parser;
mod suggest;
mod usercss_data;

pub use directive::{Directive, MetaKey};
pub use extract::{MetaSource, find_meta_source, normalize_line_endings};
pub use parser::{MetaParser, ParsedMeta, ParserOptions, UnknownKeyPolicy, parse_meta};
pub use suggest::suggest_directive;
pub use usercss_data::UsercssData;
