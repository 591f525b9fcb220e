//! External preprocessor engines.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// A failure reported by a preprocessor engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", location_suffix(.line, .column))]
pub struct PreprocessorError {
    pub message: String,
    /// 1-based line in the source handed to the engine, if reported.
    pub line: Option<u32>,
    /// 1-based column, if reported.
    pub column: Option<u32>,
}

impl PreprocessorError {
    /// Create an error without a position.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Attach a position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Move the reported line up by `lines`, the number of lines prepended to
    /// the user's source. A line inside the prepended text loses its position.
    pub(crate) fn shift_lines(mut self, lines: u32) -> Self {
        if let Some(line) = self.line {
            let shifted = line.saturating_sub(lines);
            self.line = (shifted > 0).then_some(shifted);
            if self.line.is_none() {
                self.column = None;
            }
        }
        self
    }
}

fn location_suffix(line: &Option<u32>, column: &Option<u32>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" (line {line}, column {column})"),
        (Some(line), None) => format!(" (line {line})"),
        _ => String::new(),
    }
}

/// A preprocessor such as Stylus or Less.
///
/// The source handed to the engine already starts with the variable
/// definitions in the engine's own syntax; `vars` maps each variable name to
/// its effective value for engines that want them.
#[async_trait]
pub trait PreprocessorEngine: Send + Sync {
    /// Compile `source` to CSS.
    async fn compile(
        &self,
        source: &str,
        vars: &IndexMap<String, String>,
    ) -> Result<String, PreprocessorError>;
}

/// Engines by preprocessor name.
#[derive(Default)]
pub struct EngineRegistry {
    engines: RwLock<HashMap<String, Arc<dyn PreprocessorEngine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `engine` under `name`, replacing any previous one.
    pub fn register(&self, name: impl Into<String>, engine: Arc<dyn PreprocessorEngine>) {
        self.engines.write().insert(name.into(), engine);
    }

    /// Remove the engine registered under `name`.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn PreprocessorEngine>> {
        self.engines.write().remove(name)
    }

    /// The engine registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn PreprocessorEngine>> {
        self.engines.read().get(name).cloned()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.engines.read().keys().cloned().collect();
        f.debug_struct("EngineRegistry").field("engines", &names).finish()
    }
}
