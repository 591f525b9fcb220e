//! Tests for metadata parsing of complete usercss sources.

use usercss_meta::prelude::*;
use usercss_meta::{MetaParser, validate_style};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .try_init();
}

fn source(body: &str) -> String {
    format!(
        "/* ==UserStyle==\n@name        Test\n@namespace   example.com\n@version     1.0.0\n{body}\n==/UserStyle== */\n\nbody {{ color: red }}\n"
    )
}

fn single_var(declaration: &str) -> VarDef {
    let data = parse_meta(&source(declaration)).expect("declaration should parse");
    data.vars.into_values().next().expect("one variable")
}

#[test]
fn test_effective_value_of_defaults() {
    let cases = [
        ("@var text font \"Font\" Arial, sans-serif", "Arial, sans-serif"),
        ("@var color accent \"Accent\" #112233", "rgb(17, 34, 51)"),
        ("@var checkbox on \"On\" 1", "1"),
        (
            "@var select theme \"Theme\" {\"dark:Dark\": \"#000\", \"light:Light*\": \"#fff\"}",
            "#fff",
        ),
        (
            "@var image bg \"Background\" {\"none:None\": \"none\", \"cats:Cats*\": \"url(cats.png)\"}",
            "url(cats.png)",
        ),
        ("@var number gap \"Gap\" 5", "5"),
        ("@var range size \"Size\" [12, 8, 32, 1, \"px\"]", "12px"),
        (
            "@advanced dropdown font \"Font\" {\n  serif \"Serif\" <<<EOT\nfont-family: serif; EOT;\n  mono \"Mono\" <<<EOT\nfont-family: monospace; EOT;\n}",
            "font-family: serif;",
        ),
        (
            "@advanced image logo \"Logo\" {\n  small \"Small\" \"s.png\"\n  big \"Big\" \"b.png\"\n}",
            "s.png",
        ),
    ];
    for (declaration, expected) in cases {
        let var = single_var(declaration);
        assert!(var.value.is_none(), "{declaration}");
        assert_eq!(var.effective_value(), expected, "{declaration}");
    }
}

#[test]
fn test_color_default_is_canonical() {
    let var = single_var("@var color accent \"Accent\" #ABC");
    assert_eq!(var.default, VarValue::from("rgb(170, 187, 204)"));
}

#[test]
fn test_select_default_inference() {
    let mut var = single_var("@var select choice \"Choice\" {\"a\": \"A\", \"b*\": \"B\", \"c\": \"C\"}");
    assert_eq!(var.default, VarValue::from("b"));
    let names: Vec<_> = var.kind.options().unwrap().iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);

    var.value = Some("z".into());
    let err = validate_var(&mut var, Checked::Value).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidSelectValueMismatch("z".into()));
}

#[test]
fn test_validation_gate() {
    let data = parse_meta(&source("")).unwrap();
    assert!(data.vars.is_empty());

    for missing in ["@name", "@namespace", "@version"] {
        let text: String = source("")
            .lines()
            .filter(|line| !line.starts_with(&format!("{missing} ")))
            .collect::<Vec<_>>()
            .join("\n");
        let err = parse_meta(&text).unwrap_err();
        assert!(
            matches!(err.kind, ParseErrorKind::MissingMandatory(ref keys) if keys == &[missing[1..].to_string()]),
            "{missing}: {err}"
        );
    }

    let mut data = parse_meta(&source("")).unwrap();
    data.set("namespace", "");
    assert!(matches!(
        validate_style(&mut data).unwrap_err().kind,
        ParseErrorKind::MissingMandatory(_)
    ));
}

#[test]
fn test_error_offset_points_at_bad_literal() {
    let text = source("@var checkbox broken \"Broken\" 2");
    let err = parse_meta(&text).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidCheckboxDefault);
    let index = err.index.expect("syntax errors carry a position");
    assert!(text[index..].starts_with('2'), "points at {:?}", &text[index..]);
}

#[test]
fn test_error_offset_after_crlf_normalization() {
    let text = source("@var select s \"S\" [\"a\", \"a\"]").replace('\n', "\r\n");
    let err = parse_meta(&text).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidSelectNameDuplicated);
    let normalized = text.replace("\r\n", "\n");
    assert!(normalized[err.index.unwrap()..].starts_with("[\"a\""));
}

#[test]
fn test_unknown_directive_is_skipped() {
    init_tracing();
    let data = parse_meta(&source("@futurekey whatever\n@author Someone")).unwrap();
    assert!(data.get("futurekey").is_none());
    assert_eq!(data.author(), Some("Someone"));
}

#[test]
fn test_lint_reports_unknown_directive_with_suggestion() {
    let linted = MetaParser::lint(&source("@descriptoin typo here"));
    assert_eq!(linted.errors.len(), 1);
    assert_eq!(linted.errors[0].to_string(), "Unknown metadata: @descriptoin, did you mean @description?");
    assert_eq!(linted.data.name(), Some("Test"));
}

#[test]
fn test_repeated_directive_keeps_last_value() {
    let data = parse_meta(&source("@author First\n@author Second")).unwrap();
    assert_eq!(data.author(), Some("Second"));
}

#[test]
fn test_quoted_values_are_unquoted() {
    let data = parse_meta(&source("@description \"multi\\nline\"")).unwrap();
    assert_eq!(data.description(), Some("multi\nline"));
}

#[test]
fn test_range_constraints() {
    let err = parse_meta(&source("@var range r \"R\" [50, 0, 40]")).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidRangeMax);

    let err = parse_meta(&source("@var range r \"R\" [1, 0, 10, 1, \"px\", \"em\"]")).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidRangeMultipleUnits);

    let var = single_var("@var range r \"R\" [\"%\", 50, 0, 100, 0]");
    assert_eq!(var.kind.range().unwrap().step, Some(1.0));
    assert_eq!(var.effective_value(), "50%");
}
