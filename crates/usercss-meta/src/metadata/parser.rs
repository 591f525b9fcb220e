//! Directive dispatcher: walks the `@key` directives of a metadata block.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::scanner::Scanner;
use crate::validate::{
    MANDATORY_KEYS, missing_keys, validate_preprocessor, validate_url, validate_values,
    validate_version,
};
use crate::vars::{VarDirective, parse_var};
use crate::version::normalize_version;

use super::directive::{Directive, MetaKey};
use super::extract::{find_meta_source, normalize_line_endings};
use super::suggest::suggest_directive;
use super::usercss_data::UsercssData;

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([0-9A-Za-z_-]+)[^\S\n]*").expect("directive pattern is valid"));

/// What to do with directives the parser does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    /// Skip the directive line. Keys from newer formats are expected and
    /// never an error.
    #[default]
    Ignore,
    /// Store the rest of the line under the unknown key.
    Assign,
    /// Fail with [`ParseErrorKind::UnknownMeta`].
    Reject,
}

/// Options for [`MetaParser`].
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Handling of unknown directives. Default: [`UnknownKeyPolicy::Ignore`].
    pub unknown_key: UnknownKeyPolicy,
    /// Directives that must be present and non-empty.
    /// Default: `name`, `namespace`, `version`.
    pub mandatory_keys: Vec<String>,
    /// Collect errors and keep going instead of failing on the first one.
    /// Default: false.
    pub allow_errors: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            unknown_key: UnknownKeyPolicy::Ignore,
            mandatory_keys: MANDATORY_KEYS.iter().map(|k| k.to_string()).collect(),
            allow_errors: false,
        }
    }
}

impl ParserOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used by [`MetaParser::lint`]: collect every error and reject
    /// unknown directives.
    pub fn lint() -> Self {
        Self::new()
            .unknown_key(UnknownKeyPolicy::Reject)
            .allow_errors(true)
    }

    /// Set the unknown directive policy.
    pub fn unknown_key(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_key = policy;
        self
    }

    /// Replace the mandatory directive list.
    pub fn mandatory_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Collect errors instead of failing fast.
    pub fn allow_errors(mut self, allow: bool) -> Self {
        self.allow_errors = allow;
        self
    }
}

/// Result of a parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMeta {
    pub data: UsercssData,
    /// Errors collected with [`ParserOptions::allow_errors`]. Always empty
    /// otherwise.
    pub errors: Vec<ParseError>,
}

/// Metadata parser.
///
/// Stateless between calls; one parser can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct MetaParser {
    options: ParserOptions,
}

struct BlockState {
    data: UsercssData,
    maybe_uso: bool,
}

impl MetaParser {
    /// Create a parser with the given options.
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// The options this parser was created with.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Find, parse and validate the metadata block of `source`.
    ///
    /// Line endings are normalized first; error offsets refer to the
    /// normalized text.
    pub fn parse(&self, source: &str) -> Result<ParsedMeta> {
        let source = normalize_line_endings(source);
        let meta = find_meta_source(&source)
            .ok_or_else(|| ParseError::unpositioned(ParseErrorKind::MetadataNotFound))?;
        let mut parsed = self.parse_block(meta.text, meta.offset)?;
        if !self.options.allow_errors {
            validate_values(&mut parsed.data)?;
        }
        Ok(parsed)
    }

    /// Parse every error out of `source` without failing.
    pub fn lint(source: &str) -> ParsedMeta {
        Self::new(ParserOptions::lint())
            .parse(source)
            .unwrap_or_else(|err| ParsedMeta {
                data: UsercssData::default(),
                errors: vec![err],
            })
    }

    /// Parse a metadata block that starts at byte `base` of its source.
    ///
    /// `text` must already use `\n` line endings.
    pub fn parse_block(&self, text: &str, base: usize) -> Result<ParsedMeta> {
        let mut scanner = Scanner::new(text, base);
        let mut state = BlockState {
            data: UsercssData::new(),
            maybe_uso: false,
        };
        let mut errors = Vec::new();

        let mut from = 0;
        while let Some(caps) = DIRECTIVE.captures_at(text, from) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let key_index = base + whole.start();
            scanner.set_position(whole.end());
            if let Err(err) = self.parse_directive(&mut scanner, key.as_str(), key_index, &mut state) {
                let err = err.or_at(key_index);
                if !self.options.allow_errors {
                    return Err(err);
                }
                errors.push(err);
            }
            from = scanner.position().max(whole.end());
        }

        let BlockState { mut data, maybe_uso } = state;
        if maybe_uso && data.preprocessor().is_none() {
            data.set(MetaKey::Preprocessor.as_str(), "uso");
        }

        let missing = missing_keys(&data, &self.options.mandatory_keys);
        if !missing.is_empty() {
            let err = ParseError::unpositioned(ParseErrorKind::MissingMandatory(
                missing.into_iter().map(str::to_string).collect(),
            ));
            if !self.options.allow_errors {
                return Err(err);
            }
            errors.push(err);
        }

        Ok(ParsedMeta { data, errors })
    }

    fn parse_directive(
        &self,
        scanner: &mut Scanner<'_>,
        key: &str,
        key_index: usize,
        state: &mut BlockState,
    ) -> Result<()> {
        match Directive::lookup(key) {
            Some(Directive::Var(directive)) => {
                let var = parse_var(scanner, directive)?;
                if directive == VarDirective::Advanced {
                    state.maybe_uso = true;
                }
                state.data.vars.insert(var.name.clone(), var);
            }
            Some(Directive::Key(meta_key)) => {
                let value_index = scanner.base() + scanner.position();
                let value = scanner.parse_string_to_end()?;
                let value = check_key(meta_key, value).map_err(|e| e.or_at(value_index))?;
                state.data.set(meta_key.as_str(), value);
            }
            None => match self.options.unknown_key {
                UnknownKeyPolicy::Ignore => {
                    tracing::trace!(target: "usercss_meta::parser", key, "skipping unknown metadata directive");
                    scanner.eat_line();
                }
                UnknownKeyPolicy::Assign => {
                    let value = scanner.parse_string_to_end()?;
                    state.data.set(key, value);
                }
                UnknownKeyPolicy::Reject => {
                    scanner.eat_line();
                    return Err(ParseError::new(
                        ParseErrorKind::UnknownMeta {
                            key: key.to_string(),
                            suggestion: suggest_directive(key).map(str::to_string),
                        },
                        key_index,
                    ));
                }
            },
        }
        Ok(())
    }
}

/// Validate a simple directive value, normalizing versions.
fn check_key(key: MetaKey, value: String) -> Result<String> {
    match key {
        MetaKey::Version => {
            let normalized = normalize_version(&value).to_string();
            validate_version(&normalized)?;
            Ok(normalized)
        }
        MetaKey::Preprocessor => {
            validate_preprocessor(&value)?;
            Ok(value)
        }
        key if key.is_url() => {
            validate_url(&value)?;
            Ok(value)
        }
        _ => Ok(value),
    }
}

/// Parse and validate the metadata of `source` with default options.
pub fn parse_meta(source: &str) -> Result<UsercssData> {
    MetaParser::default().parse(source).map(|parsed| parsed.data)
}
