//! User-customizable style variables.
//!
//! [`parse_var`] reads one `@var`/`@advanced` declaration, [`validate_var`]
//! checks a default or a customized value against its [`VarKind`].

mod parser;
mod types;
mod validate;

pub use parser::{VarDirective, parse_var};
pub use types::{RangeSpec, VarDef, VarKind, VarOption, VarValue, format_number};
pub use validate::{Checked, UNITS, validate_var};
