//! Lexical checks on section code.

use std::sync::LazyLock;

use regex::Regex;

static EMPTY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\s+|/\*[\s\S]*?(?:\*/|$)|@namespace[^;]+;|@charset[^;]+;)")
        .expect("empty token pattern is valid")
});

static LEADING_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\s+|/\*[\s\S]*?(?:\*/|$)|(@(?:charset|import|namespace)[^;]*;))")
        .expect("leading token pattern is valid")
});

/// Whether `code` holds nothing but whitespace, comments, `@namespace` and
/// `@charset` statements.
pub fn style_code_empty(code: &str) -> bool {
    let mut pos = 0;
    while pos < code.len() {
        match EMPTY_TOKEN.find(&code[pos..]) {
            Some(m) if !m.is_empty() => pos += m.end(),
            _ => return false,
        }
    }
    true
}

/// Byte offset just past the leading `@charset`, `@import` and `@namespace`
/// statements of `code`, or 0 if there are none.
///
/// These statements must precede every other rule, so injected code goes
/// after them.
pub fn global_rules_end(code: &str) -> usize {
    let mut pos = 0;
    let mut end = 0;
    while let Some(caps) = LEADING_TOKEN.captures(&code[pos..]) {
        let Some(whole) = caps.get(0).filter(|m| !m.is_empty()) else {
            break;
        };
        pos += whole.end();
        if caps.get(1).is_some() {
            end = pos;
        }
    }
    end
}
