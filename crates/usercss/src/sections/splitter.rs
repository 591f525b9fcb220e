//! The section splitter collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Section;
use crate::Result;

/// CSS to split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    pub code: String,
    /// Identity of the style being built, if it is installed.
    pub style_id: Option<u64>,
}

impl SplitRequest {
    pub fn new(code: impl Into<String>, style_id: Option<u64>) -> Self {
        Self {
            code: code.into(),
            style_id,
        }
    }
}

/// A problem found while splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{line}:{column} {message}")]
pub struct SplitError {
    pub message: String,
    /// 1-based line in the split code.
    pub line: u32,
    /// 1-based column in the split code.
    pub column: u32,
    /// Whether the sections are still usable despite the error.
    pub recoverable: bool,
}

impl SplitError {
    /// Create an error that makes the result unusable.
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            recoverable: false,
        }
    }

    /// Mark the error as recoverable.
    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }
}

/// Sections and errors produced by a splitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    pub sections: Vec<Section>,
    pub errors: Vec<SplitError>,
}

impl SplitOutput {
    /// Errors that make the sections unusable.
    pub fn blocking_errors(&self) -> impl Iterator<Item = &SplitError> {
        self.errors.iter().filter(|e| !e.recoverable)
    }
}

/// Turns CSS text into sections.
#[async_trait]
pub trait SectionSplitter: Send + Sync {
    /// Split `request.code` into sections.
    async fn split(&self, request: SplitRequest) -> Result<SplitOutput>;
}
