//! `@-moz-document` section splitter.

use std::sync::LazyLock;

use async_trait::async_trait;
use cssparser::{
    Delimiter, ParseError as CssParseError, ParseErrorKind as CssParseErrorKind, Parser,
    ParserInput, Token, match_ignore_ascii_case,
};
use regex::Regex;

use super::splitter::{SectionSplitter, SplitError, SplitOutput, SplitRequest};
use super::Section;
use crate::Result;

/// The `@namespace` rule editors put at the top of every style.
const BOILERPLATE_NAMESPACE: &str = "@namespace url(http://www.w3.org/1999/xhtml);";

static SINGLE_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[^\\]|^)\\(?:[^\\]|$)").expect("escape pattern is valid"));

type CriterionError<'i> = CssParseError<'i, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Criterion {
    Url,
    UrlPrefix,
    Domain,
    Regexp,
}

/// Splits CSS on `@-moz-document` blocks.
///
/// Each block becomes a section with its `url()`, `url-prefix()`, `domain()`
/// and `regexp()` criteria. Text between blocks becomes global sections.
/// Section code is trimmed; sections without code and criteria are dropped,
/// as is the boilerplate xhtml `@namespace` section.
#[derive(Debug, Clone, Copy, Default)]
pub struct MozDocumentSplitter;

impl MozDocumentSplitter {
    pub fn new() -> Self {
        Self
    }

    /// Split `code` synchronously.
    pub fn split_code(&self, code: &str) -> SplitOutput {
        let mut input = ParserInput::new(code);
        let mut parser = Parser::new(&mut input);
        let mut out = SplitOutput::default();
        let mut global_start = parser.position();

        loop {
            let before = parser.position();
            let is_document = match parser.next_including_whitespace_and_comments() {
                Ok(Token::AtKeyword(name)) => {
                    name.eq_ignore_ascii_case("-moz-document") || name.eq_ignore_ascii_case("document")
                }
                Ok(_) => false,
                Err(_) => break,
            };
            if !is_document {
                continue;
            }

            let outer = parser.slice(global_start..before);
            push_section(&mut out.sections, Section::global(outer));
            match parse_document_rule(&mut parser) {
                Ok(section) => push_section(&mut out.sections, section),
                Err(err) => out.errors.push(err),
            }
            global_start = parser.position();
        }

        let outer = parser.slice_from(global_start);
        push_section(&mut out.sections, Section::global(outer));
        out
    }
}

#[async_trait]
impl SectionSplitter for MozDocumentSplitter {
    async fn split(&self, request: SplitRequest) -> Result<SplitOutput> {
        Ok(self.split_code(&request.code))
    }
}

/// Parse the prelude and block of a document rule, starting after its
/// at-keyword.
fn parse_document_rule<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<Section, SplitError> {
    let mut section = Section::default();
    let prelude: std::result::Result<(), CriterionError<'i>> = parser.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
        loop {
            parse_criterion(p, &mut section)?;
            if p.is_exhausted() {
                return Ok(());
            }
            p.expect_comma()?;
        }
    });

    let location = parser.current_source_location();
    let has_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
    prelude.map_err(|err| to_split_error(&err))?;
    if !has_block {
        return Err(SplitError::new(
            "Expected '{' after @-moz-document",
            location.line + 1,
            location.column,
        ));
    }

    let code = parser.parse_nested_block(|p| {
        let start = p.position();
        while p.next_including_whitespace_and_comments().is_ok() {}
        Ok::<_, CssParseError<'_, ()>>(p.slice_from(start).to_string())
    });
    section.code = code.unwrap_or_default();
    Ok(section)
}

fn parse_criterion<'i>(
    p: &mut Parser<'i, '_>,
    section: &mut Section,
) -> std::result::Result<(), CriterionError<'i>> {
    let location = p.current_source_location();
    let token = p.next()?.clone();
    let name = match token {
        Token::UnquotedUrl(url) => {
            section.urls.push(url.to_string());
            return Ok(());
        }
        Token::Function(name) => name,
        other => return Err(location.new_unexpected_token_error(other)),
    };
    let criterion = match_ignore_ascii_case! { &*name,
        "url" => Criterion::Url,
        "url-prefix" => Criterion::UrlPrefix,
        "domain" => Criterion::Domain,
        "regexp" => Criterion::Regexp,
        _ => return Err(location.new_custom_error(format!("Unknown @-moz-document function: {}", &*name))),
    };

    let value = p.parse_nested_block(|p| {
        let start = p.position();
        let Ok(unescaped) = p.try_parse(|p| p.expect_string().map(|s| s.to_string())) else {
            while p.next().is_ok() {}
            return Ok(p.slice_from(start).trim().to_string());
        };
        let raw = p.slice_from(start).trim();
        let trailing = p.current_source_location();
        if !p.is_exhausted() {
            return Err(trailing.new_custom_error(format!(
                "Unexpected token after the {}() string",
                &*name
            )));
        }
        // keep regexp escapes like `\.` that CSS string unescaping would drop
        let inner = raw
            .strip_prefix(['"', '\''])
            .and_then(|r| r.strip_suffix(['"', '\'']));
        Ok::<_, CriterionError<'i>>(match inner {
            Some(inner) if criterion == Criterion::Regexp && SINGLE_ESCAPE.is_match(raw) => {
                inner.to_string()
            }
            _ => unescaped,
        })
    })?;

    let target = match criterion {
        Criterion::Url => &mut section.urls,
        Criterion::UrlPrefix => &mut section.url_prefixes,
        Criterion::Domain => &mut section.domains,
        Criterion::Regexp => &mut section.regexps,
    };
    target.push(value);
    Ok(())
}

fn to_split_error(err: &CriterionError<'_>) -> SplitError {
    let message = match &err.kind {
        CssParseErrorKind::Custom(message) => message.clone(),
        CssParseErrorKind::Basic(kind) => format!("Invalid @-moz-document rule: {kind:?}"),
    };
    SplitError::new(message, err.location.line + 1, err.location.column)
}

fn push_section(sections: &mut Vec<Section>, mut section: Section) {
    section.code = section.code.trim().to_string();
    if section.code.is_empty() && section.is_global() {
        return;
    }
    if section.code == BOILERPLATE_NAMESPACE {
        return;
    }
    sections.push(section);
}
