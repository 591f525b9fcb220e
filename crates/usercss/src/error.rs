//! Error types for building styles.

use usercss_meta::ParseError;

use crate::preprocess::PreprocessorError;
use crate::sections::SplitError;

/// Result type alias for style operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a style.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The metadata block is missing or invalid.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The preprocessor engine rejected the source.
    #[error("Preprocessor error: {0}")]
    Preprocessor(#[from] PreprocessorError),

    /// No engine is registered for a known preprocessor.
    #[error("Preprocessor '{0}' is not available")]
    PreprocessorUnavailable(String),

    /// The section splitter reported blocking errors.
    #[error("Failed to split sections: {}", format_split_errors(.0))]
    Sections(Vec<SplitError>),

    /// The compiled style has no sections.
    #[error("Style does not contain any actual CSS to apply")]
    NoCss,

    /// The section splitter did not answer in time.
    #[error("Section splitter timed out")]
    SplitterTimeout,

    /// The section splitter worker is gone.
    #[error("Section splitter is not running")]
    SplitterClosed,
}

impl Error {
    /// Create a preprocessor error.
    pub fn preprocessor(message: impl Into<String>) -> Self {
        Self::Preprocessor(PreprocessorError::new(message))
    }

    /// Create an error for a preprocessor without a registered engine.
    pub fn preprocessor_unavailable(name: impl Into<String>) -> Self {
        Self::PreprocessorUnavailable(name.into())
    }

    /// The source offset of the failure, for metadata errors that have one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Parse(err) => err.index,
            _ => None,
        }
    }
}

fn format_split_errors(errors: &[SplitError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
