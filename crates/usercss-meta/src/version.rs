//! Relaxed semver parsing and ordering.
//!
//! A version is a dot-separated digit sequence (`1`, `1.2`, `1.2.3.4.5`), an
//! optional pre-release chunk (`-` followed by dot-separated word characters)
//! and an optional build chunk (`+` followed by the same). A leading `v` or
//! `=` is tolerated and stripped by [`normalize_version`].

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, ParseErrorKind, Result};

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]+(\.[0-9]+)*(?:-([A-Za-z0-9_][-A-Za-z0-9_]*(\.[-A-Za-z0-9_]+)*))?(?:\+([A-Za-z0-9_][-A-Za-z0-9_]*(\.[-A-Za-z0-9_]+)*))?$",
    )
    .expect("version pattern is valid")
});

/// Strip a leading `v` or `=` from a version string.
pub fn normalize_version(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('='))
        .unwrap_or(version)
}

/// Check whether `version` is a relaxed semver, after normalization.
pub fn is_valid_version(version: &str) -> bool {
    VERSION.is_match(normalize_version(version))
}

/// Compare two version strings.
///
/// Fails with [`ParseErrorKind::InvalidVersion`] if either side is not a
/// valid version. Build metadata does not take part in the ordering.
pub fn compare_version(a: &str, b: &str) -> Result<Ordering> {
    let a = Version::parse(a)?;
    let b = Version::parse(b)?;
    Ok(a.cmp_with(&b))
}

struct Version<'a> {
    main: &'a str,
    pre: Option<&'a str>,
}

impl<'a> Version<'a> {
    fn parse(raw: &'a str) -> Result<Self> {
        let normalized = normalize_version(raw);
        if !VERSION.is_match(normalized) {
            return Err(ParseError::unpositioned(ParseErrorKind::InvalidVersion(
                raw.to_string(),
            )));
        }
        let without_build = normalized.split('+').next().unwrap_or(normalized);
        Ok(match without_build.split_once('-') {
            Some((main, pre)) => Self {
                main,
                pre: Some(pre),
            },
            None => Self {
                main: without_build,
                pre: None,
            },
        })
    }

    fn cmp_with(&self, other: &Self) -> Ordering {
        compare_main(self.main, other.main).then_with(|| match (self.pre, other.pre) {
            (None, None) => Ordering::Equal,
            // 1.2.3-beta sorts before 1.2.3
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_pre_release(a, b),
        })
    }
}

fn compare_main(a: &str, b: &str) -> Ordering {
    let a: Vec<&str> = a.split('.').collect();
    let b: Vec<&str> = b.split('.').collect();
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or("0");
            let y = b.get(i).copied().unwrap_or("0");
            compare_digits(x, y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let a: Vec<&str> = a.split('.').collect();
    let b: Vec<&str> = b.split('.').collect();
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            if is_digits(x) && is_digits(y) {
                compare_digits(x, y)
            } else {
                x.cmp(y)
            }
        })
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Numeric order of two digit strings of any length.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
