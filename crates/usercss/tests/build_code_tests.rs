//! Tests for compiling styles into sections.

use std::result::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use usercss::prelude::*;
use usercss::{SplitError, strip_meta};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

fn style(meta: &str, code: &str) -> Style {
    let source = format!(
        "/* ==UserStyle==\n@name Test\n@namespace example.com\n@version 1.0.0\n{meta}\n==/UserStyle== */\n{code}"
    );
    build_meta(&source).expect("test style should parse")
}

fn moz_compiler() -> Compiler {
    Compiler::new(Arc::new(MozDocumentSplitter::new()))
}

/// Splitter that records what it was asked to split.
#[derive(Default)]
struct Recording {
    requests: Mutex<Vec<SplitRequest>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    delay: Option<Duration>,
    output: Option<SplitOutput>,
}

#[async_trait]
impl SectionSplitter for Recording {
    async fn split(&self, request: SplitRequest) -> usercss::Result<SplitOutput> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let output = match &self.output {
            Some(output) => output.clone(),
            None => SplitOutput {
                sections: vec![Section::global(request.code.trim())],
                errors: Vec::new(),
            },
        };
        self.requests.lock().push(request);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(output)
    }
}

/// Engine that echoes a fixed result and keeps the last input.
struct FakeEngine {
    seen: Mutex<Option<(String, IndexMap<String, String>)>>,
    result: Result<String, PreprocessorError>,
}

impl FakeEngine {
    fn new(result: Result<String, PreprocessorError>) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(None),
            result,
        })
    }
}

#[async_trait]
impl PreprocessorEngine for FakeEngine {
    async fn compile(
        &self,
        source: &str,
        vars: &IndexMap<String, String>,
    ) -> Result<String, PreprocessorError> {
        *self.seen.lock() = Some((source.to_string(), vars.clone()));
        self.result.clone()
    }
}

#[tokio::test]
async fn test_default_preprocessor_injects_custom_properties() {
    init_tracing();
    let style = style(
        "@var color bg \"Background\" #222\n@var range gap \"Gap\" [4, 0, 10, 1, \"px\"]",
        "@-moz-document domain(\"example.com\") {\n  a { color: var(--bg) }\n}\n",
    );
    let built = moz_compiler().build_code(style, false).await.unwrap();

    assert!(built.errors.is_empty());
    let sections = &built.style.sections;
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].domains, ["example.com"]);
    assert_eq!(
        sections[0].code,
        ":root {\n  --bg: rgb(34, 34, 34);\n  --gap: 4px;\n}\na { color: var(--bg) }"
    );
}

#[tokio::test]
async fn test_metadata_comment_is_not_compiled() {
    let splitter = Arc::new(Recording::default());
    let compiler = Compiler::new(splitter.clone());
    let style = style("", "b { color: red }");
    compiler.build_code(style, false).await.unwrap();

    let requests = splitter.requests.lock();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].code.contains("==UserStyle=="));
    assert!(requests[0].code.contains("b { color: red }"));
}

#[tokio::test]
async fn test_uso_placeholders_are_substituted() {
    let style = style(
        "@preprocessor uso\n@var color accent \"Accent\" #112233",
        "a { color: /*[[accent]]*/; box-shadow: 0 0 1px rgba(/*[[accent-rgb]]*/, .5) }",
    );
    let built = moz_compiler().build_code(style, false).await.unwrap();
    assert_eq!(
        built.style.sections[0].code,
        "a { color: #112233; box-shadow: 0 0 1px rgba(17, 34, 51, .5) }"
    );
}

#[tokio::test]
async fn test_stylus_gets_variable_prelude() {
    let engine = FakeEngine::new(Ok("body { color: #222 }".to_string()));
    let compiler = moz_compiler();
    compiler.register_engine("stylus", engine.clone());

    let style = style(
        "@preprocessor stylus\n@var color fg \"Text\" #222\n@var checkbox on \"On\" 1",
        "body\n  color fg\n",
    );
    let built = compiler.build_code(style, false).await.unwrap();
    assert_eq!(built.style.sections, [Section::global("body { color: #222 }")]);

    let (source, vars) = engine.seen.lock().clone().expect("engine was called");
    assert!(source.starts_with("fg = rgb(34, 34, 34);\non = 1;\n"));
    assert!(source.ends_with("body\n  color fg\n"));
    assert_eq!(vars["fg"], "rgb(34, 34, 34)");
    assert_eq!(vars["on"], "1");
}

#[tokio::test]
async fn test_preprocessor_error_lines_exclude_prelude() {
    let engine = FakeEngine::new(Err(PreprocessorError::new("expected indent").at(7, 3)));
    let compiler = moz_compiler();
    compiler.register_engine("less", engine);

    let style = style(
        "@preprocessor less\n@var color fg \"Text\" #222\n@var color bg \"Back\" #fff",
        "a { color: @fg }",
    );
    let err = compiler.build_code(style, false).await.unwrap_err();
    let Error::Preprocessor(err) = err else {
        panic!("expected a preprocessor error, got {err:?}");
    };
    assert_eq!(err.line, Some(5));
    assert_eq!(err.column, Some(3));
}

#[tokio::test]
async fn test_missing_engine_is_an_error() {
    let style = style("@preprocessor less", "a { color: red }");
    let err = moz_compiler().build_code(style, false).await.unwrap_err();
    assert!(matches!(err, Error::PreprocessorUnavailable(name) if name == "less"));
}

#[tokio::test]
async fn test_blocking_split_errors() {
    let output = SplitOutput {
        sections: vec![Section::global("a {}")],
        errors: vec![
            SplitError::new("Unexpected '}'", 3, 1),
            SplitError::new("Unknown property", 1, 5).recoverable(),
        ],
    };
    let compiler = Compiler::new(Arc::new(Recording {
        output: Some(output),
        ..Recording::default()
    }));

    let err = compiler.build_code(style("", "a {}"), false).await.unwrap_err();
    match err {
        Error::Sections(errors) => assert_eq!(errors, [SplitError::new("Unexpected '}'", 3, 1)]),
        other => panic!("expected section errors, got {other:?}"),
    }

    let built = compiler.build_code(style("", "a {}"), true).await.unwrap();
    assert_eq!(built.errors.len(), 2);
    assert_eq!(built.style.sections.len(), 1);
}

#[tokio::test]
async fn test_recoverable_errors_do_not_fail() {
    let output = SplitOutput {
        sections: vec![Section::global("a {}")],
        errors: vec![SplitError::new("Unknown property", 1, 5).recoverable()],
    };
    let compiler = Compiler::new(Arc::new(Recording {
        output: Some(output),
        ..Recording::default()
    }));
    let built = compiler.build_code(style("", "a {}"), false).await.unwrap();
    assert_eq!(built.errors.len(), 1);
}

#[tokio::test]
async fn test_bad_document_rule_is_reported() {
    let code = "a {}\n@-moz-document nope(\"x\") {\n  b {}\n}\n";
    let err = moz_compiler().build_code(style("", code), false).await.unwrap_err();
    assert!(matches!(&err, Error::Sections(errors) if errors.len() == 1));
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn test_compiler_survives_malformed_criteria() {
    let compiler = moz_compiler();
    let code = "@-moz-document regexp(\"a\\.b\" \u{e9}) {\n  a {}\n}\n";
    let err = compiler.build_code(style("", code), false).await.unwrap_err();
    assert!(matches!(&err, Error::Sections(errors) if errors.len() == 1));

    let built = compiler.build_code(style("", "a { color: red }"), false).await.unwrap();
    assert_eq!(built.style.sections, [Section::global("a { color: red }")]);
}

#[tokio::test]
async fn test_style_without_css() {
    let compiler = moz_compiler();
    let err = compiler.build_code(style("", "\n"), false).await;
    assert!(matches!(err, Err(Error::NoCss)));

    let built = compiler.build_code(style("", "\n"), true).await.unwrap();
    assert!(built.style.sections.is_empty());
}

#[tokio::test]
async fn test_concurrent_builds_are_serialized() {
    let splitter = Arc::new(Recording {
        delay: Some(Duration::from_millis(10)),
        ..Recording::default()
    });
    let compiler = Compiler::new(splitter.clone());

    let compiler = &compiler;
    let build = move |id: u64| {
        let mut style = style("", &format!("a{id} {{}}"));
        style.id = Some(id);
        compiler.build_code(style, false)
    };
    let (a, b, c) = tokio::join!(build(1), build(2), build(3));
    for built in [a, b, c] {
        built.unwrap();
    }

    assert_eq!(splitter.max_active.load(Ordering::SeqCst), 1);
    let order: Vec<_> = splitter.requests.lock().iter().map(|r| r.style_id).collect();
    assert_eq!(order, [Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_hung_splitter_times_out() {
    let splitter = Arc::new(Recording {
        delay: Some(Duration::from_secs(3600)),
        ..Recording::default()
    });
    let options = CompileOptions::new().splitter_timeout(Some(Duration::from_millis(20)));
    let compiler = Compiler::with_options(splitter, options);
    let err = compiler.build_code(style("", "a {}"), false).await.unwrap_err();
    assert!(matches!(err, Error::SplitterTimeout));
}

#[test]
fn test_strip_meta_keeps_surrounding_code() {
    let style = style("", "a {}");
    assert_eq!(strip_meta(&style.source_code), "\na {}");
}
