//! Splitting compiled CSS into sections.
//!
//! A [`SectionSplitter`] turns CSS text into [`Section`]s. The built-in
//! [`MozDocumentSplitter`] understands `@-moz-document` blocks;
//! [`SplitterQueue`] serializes requests to any splitter through a single
//! worker task.

mod code;
mod moz;
mod queue;
mod splitter;

use serde::{Deserialize, Serialize};

pub use code::{global_rules_end, style_code_empty};
pub use moz::MozDocumentSplitter;
pub use queue::SplitterQueue;
pub use splitter::{SectionSplitter, SplitError, SplitOutput, SplitRequest};

/// CSS code and the pages it applies to.
///
/// A section without criteria is global and applies everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub url_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regexps: Vec<String>,
}

impl Section {
    /// A section that applies everywhere.
    pub fn global(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Whether the section has no matching criteria.
    pub fn is_global(&self) -> bool {
        self.urls.is_empty()
            && self.url_prefixes.is_empty()
            && self.domains.is_empty()
            && self.regexps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_only_present_criteria() {
        let section = Section {
            code: "a{}".into(),
            url_prefixes: vec!["https://example.com/".into()],
            ..Section::default()
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "a{}", "urlPrefixes": ["https://example.com/"]})
        );
        assert!(!section.is_global());
        assert!(Section::global("b{}").is_global());
    }
}
