//! Checks on directive values and on a whole metadata object.

use url::Url;

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::metadata::{MetaKey, UsercssData};
use crate::vars::{Checked, validate_var};
use crate::version::compare_version;

/// Directives every style must declare with a non-empty value.
pub const MANDATORY_KEYS: [&str; 3] = ["name", "namespace", "version"];

/// Values accepted by `@preprocessor`.
pub const PREPROCESSORS: [&str; 4] = ["default", "uso", "stylus", "less"];

/// Check that `value` is an absolute http(s) URL.
pub fn validate_url(value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|_| ParseError::unpositioned(ParseErrorKind::InvalidUrl(value.to_string())))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ParseError::unpositioned(ParseErrorKind::InvalidUrlProtocol(
            format!("{scheme}:"),
        ))),
    }
}

/// Check that `value` is a valid relaxed semver.
pub fn validate_version(value: &str) -> Result<()> {
    compare_version(value, "0.0.0").map(|_| ())
}

/// Check that `value` names a supported preprocessor.
pub fn validate_preprocessor(value: &str) -> Result<()> {
    if PREPROCESSORS.contains(&value) {
        Ok(())
    } else {
        Err(ParseError::unpositioned(ParseErrorKind::UnknownPreprocessor(
            value.to_string(),
        )))
    }
}

/// Names of `keys` that are absent or empty in `data`.
pub fn missing_keys<'k>(data: &UsercssData, keys: &'k [String]) -> Vec<&'k str> {
    keys.iter()
        .map(String::as_str)
        .filter(|k| data.get(k).is_none_or(|v| v.trim().is_empty()))
        .collect()
}

/// Re-validate a complete metadata object.
///
/// Checks the mandatory directives, then everything [`validate_values`]
/// checks. Errors carry no position.
pub fn validate_style(data: &mut UsercssData) -> Result<()> {
    let missing: Vec<String> = MANDATORY_KEYS
        .iter()
        .filter(|k| data.get(k).is_none_or(|v| v.trim().is_empty()))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::unpositioned(ParseErrorKind::MissingMandatory(missing)));
    }
    validate_values(data)
}

/// Re-validate the version, URL directives, the preprocessor, and the
/// default and value of every variable.
///
/// Color defaults and values are rewritten to canonical form.
pub fn validate_values(data: &mut UsercssData) -> Result<()> {
    if let Some(version) = data.version() {
        validate_version(version)?;
    }
    for key in MetaKey::ALL.into_iter().filter(|k| k.is_url()) {
        if let Some(url) = data.key(key) {
            validate_url(url)?;
        }
    }
    if let Some(preprocessor) = data.preprocessor() {
        validate_preprocessor(preprocessor)?;
    }
    for var in data.vars.values_mut() {
        validate_var(var, Checked::Default)?;
        validate_var(var, Checked::Value)?;
    }
    Ok(())
}
