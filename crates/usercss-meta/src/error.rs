//! Error types for metadata parsing.

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// What went wrong while parsing or validating a metadata block.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    /// Could not find a `==UserStyle==` comment in the source.
    #[error("Could not find metadata")]
    MetadataNotFound,

    /// A word (`[\w-]+`) was expected.
    #[error("Invalid word: missing {expected}")]
    InvalidWord { expected: &'static str },

    /// A quoted, backtick, or bare string was expected.
    #[error("Invalid string")]
    InvalidString,

    /// A numeric literal was expected.
    #[error("Invalid number")]
    InvalidNumber,

    /// One of the listed characters was expected.
    #[error("Missing character: {}", format_chars(.0))]
    MissingChar(Vec<char>),

    /// The block ended in the middle of a token.
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// A `<<<EOT ... EOT;` block was expected.
    #[error("Missing EOT")]
    MissingEot,

    /// A directive has no value on its line.
    #[error("Missing value")]
    MissingValue,

    /// A bare word inside a JSON literal that is not `null`, `true` or `false`.
    #[error("Invalid JSON: unknown literal '{0}'")]
    UnknownJsonLiteral(String),

    /// The type word of a `@var`/`@advanced` directive is not recognized.
    #[error("Unknown @{directive} type: {ty}")]
    UnknownVarType { directive: String, ty: String },

    /// Checkbox default is not `0` or `1`.
    #[error("value must be 0 or 1")]
    InvalidCheckboxDefault,

    /// Number/range body is neither an array nor a number.
    #[error("the default value of @var {0} must be an array or a number")]
    InvalidRange(String),

    /// Number/range array holds an entry that is not a number, string or null.
    #[error("value must be number, string, or null")]
    InvalidRangeValue,

    /// Number/range array holds more than `[default, min, max, step]`.
    #[error("the array contains too many values")]
    InvalidRangeTooManyValues,

    /// Number/range array holds more than one unit string.
    #[error("units is already defined")]
    InvalidRangeMultipleUnits,

    /// Number/range checked value is not a number.
    #[error("the value of @var {0} must be a number")]
    InvalidRangeDefault(String),

    /// Number/range checked value is below `min`.
    #[error("the value is smaller than the minimum")]
    InvalidRangeMin,

    /// Number/range checked value is above `max`.
    #[error("the value is larger than the maximum")]
    InvalidRangeMax,

    /// Number/range checked value is not a multiple of `step`.
    #[error("the value is not a multiple of the step")]
    InvalidRangeStep,

    /// Number/range units are not a CSS unit.
    #[error("Invalid CSS unit: {0}")]
    InvalidRangeUnits(String),

    /// Select body is not an object or an array.
    #[error("The value must be an array or object")]
    InvalidSelect,

    /// Select option list is empty.
    #[error("Option list is empty")]
    InvalidSelectEmptyOptions,

    /// Two options share a name.
    #[error("Option name is duplicated")]
    InvalidSelectNameDuplicated,

    /// More than one option is starred.
    #[error("multiple default values")]
    InvalidSelectMultipleDefaults,

    /// An option key or value is not a string.
    #[error("Values in the object/array must be strings")]
    InvalidSelectValue,

    /// An option label is empty.
    #[error("Option label is empty")]
    InvalidSelectLabel,

    /// The checked value does not name an existing option.
    #[error("Value '{0}' does not match any option")]
    InvalidSelectValueMismatch(String),

    /// The color cannot be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The version string is not a relaxed semver.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// A `*URL` value is not a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A `*URL` value uses a protocol other than http(s).
    #[error("Invalid protocol: {0}")]
    InvalidUrlProtocol(String),

    /// The `@preprocessor` value is not supported.
    #[error("Unknown preprocessor: {0}")]
    UnknownPreprocessor(String),

    /// An unrecognized directive under [`UnknownKeyPolicy::Reject`](crate::UnknownKeyPolicy::Reject).
    #[error("Unknown metadata: @{key}{}", .suggestion.as_ref().map(|s| format!(", did you mean @{s}?")).unwrap_or_default())]
    UnknownMeta {
        key: String,
        suggestion: Option<String>,
    },

    /// Mandatory directives are missing or empty.
    #[error("Missing metadata: {}", .0.iter().map(|k| format!("@{k}")).collect::<Vec<_>>().join(", "))]
    MissingMandatory(Vec<String>),
}

/// Metadata parse error with the position it was detected at.
///
/// `index` is a byte offset into the (line-ending normalized) source code the
/// metadata block was extracted from. Post-parse validation failures may carry
/// no position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    /// Machine-readable failure kind.
    pub kind: ParseErrorKind,
    /// Absolute byte offset of the failure, if known.
    pub index: Option<usize>,
}

impl ParseError {
    /// Create an error pointing at `index`.
    pub fn new(kind: ParseErrorKind, index: usize) -> Self {
        Self {
            kind,
            index: Some(index),
        }
    }

    /// Create an error with no position.
    pub fn unpositioned(kind: ParseErrorKind) -> Self {
        Self { kind, index: None }
    }

    /// Attach `index` if the error has no position yet.
    pub fn or_at(mut self, index: usize) -> Self {
        self.index.get_or_insert(index);
        self
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::unpositioned(kind)
    }
}

fn format_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
