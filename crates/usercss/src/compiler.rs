//! Compiling a style's source into sections.

use std::sync::Arc;
use std::time::Duration;

use usercss_meta::find_meta_source;

use crate::preprocess::{
    EngineRegistry, Preprocessor, PreprocessorEngine, effective_vars, inject_vars, substitute_uso,
};
use crate::sections::{SectionSplitter, SplitError, SplitRequest, SplitterQueue};
use crate::style::Style;
use crate::{Error, Result};

/// Options for a [`Compiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Upper bound for one section-splitting request; `None` waits forever.
    /// Default: 10 seconds.
    pub splitter_timeout: Option<Duration>,
    /// Requests that may wait for the splitter before callers block.
    /// Default: 16.
    pub queue_capacity: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            splitter_timeout: Some(Duration::from_secs(10)),
            queue_capacity: 16,
        }
    }
}

impl CompileOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request splitter timeout.
    pub fn splitter_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.splitter_timeout = timeout;
        self
    }

    /// Set the splitter queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// A compiled style and the recoverable problems found on the way.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub style: Style,
    /// Everything the splitter reported. Blocking errors only show up here
    /// when the build was lenient.
    pub errors: Vec<SplitError>,
}

/// Turns styles into sections.
///
/// All section splitting goes through one [`SplitterQueue`], so concurrent
/// builds are answered in the order they were submitted.
pub struct Compiler {
    splitter: SplitterQueue,
    engines: EngineRegistry,
    options: CompileOptions,
}

impl Compiler {
    /// Create a compiler with default options.
    ///
    /// Spawns the splitter worker, so this must be called from within a
    /// Tokio runtime.
    pub fn new(splitter: Arc<dyn SectionSplitter>) -> Self {
        Self::with_options(splitter, CompileOptions::default())
    }

    /// Create a compiler with custom options.
    pub fn with_options(splitter: Arc<dyn SectionSplitter>, options: CompileOptions) -> Self {
        let queue = SplitterQueue::spawn(splitter, options.splitter_timeout, options.queue_capacity);
        Self {
            splitter: queue,
            engines: EngineRegistry::new(),
            options,
        }
    }

    /// Register the engine for `stylus` or `less`.
    pub fn register_engine(&self, name: impl Into<String>, engine: Arc<dyn PreprocessorEngine>) {
        self.engines.register(name, engine);
    }

    /// The engines known to this compiler.
    pub fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Preprocess and split `style`, replacing its sections.
    ///
    /// With `allow_errors`, blocking splitter errors and an empty result are
    /// returned alongside the style instead of failing the build.
    pub async fn build_code(&self, mut style: Style, allow_errors: bool) -> Result<BuildOutput> {
        let data = &style.usercss_data;
        let preprocessor = Preprocessor::from_name(data.preprocessor());
        let code = strip_meta(&style.source_code);

        let css = match preprocessor {
            Preprocessor::Default => code,
            Preprocessor::Uso => substitute_uso(&code, &data.vars),
            Preprocessor::Stylus | Preprocessor::Less => {
                let name = preprocessor.as_str();
                let engine = self
                    .engines
                    .get(name)
                    .ok_or_else(|| Error::preprocessor_unavailable(name))?;
                let prelude = preprocessor.var_prelude(&data.vars);
                let prelude_lines = u32::try_from(prelude.lines().count()).unwrap_or(u32::MAX);
                let source = prelude + &code;
                engine
                    .compile(&source, &effective_vars(&data.vars))
                    .await
                    .map_err(|err| err.shift_lines(prelude_lines))?
            }
        };

        tracing::debug!(
            target: "usercss::compiler",
            preprocessor = preprocessor.as_str(),
            style_id = ?style.id,
            "preprocessed style"
        );

        let output = self.splitter.split(SplitRequest::new(css, style.id)).await?;
        let blocking: Vec<SplitError> = output.blocking_errors().cloned().collect();
        if !allow_errors {
            if !blocking.is_empty() {
                return Err(Error::Sections(blocking));
            }
            if output.sections.is_empty() {
                return Err(Error::NoCss);
            }
        }

        let mut sections = output.sections;
        if preprocessor == Preprocessor::Default {
            inject_vars(&mut sections, &style.usercss_data.vars);
        }
        style.sections = sections;
        Ok(BuildOutput {
            style,
            errors: output.errors,
        })
    }
}

/// `code` without its metadata comment.
pub fn strip_meta(code: &str) -> String {
    match find_meta_source(code) {
        Some(meta) => {
            let mut out = String::with_capacity(code.len() - meta.comment.len());
            out.push_str(&code[..meta.comment.start]);
            out.push_str(&code[meta.comment.end..]);
            out
        }
        None => code.to_string(),
    }
}
