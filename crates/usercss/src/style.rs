//! The installable style object.

use serde::{Deserialize, Serialize};
use usercss_meta::{MetaKey, MetaParser, UsercssData, normalize_line_endings};

use crate::reconcile::assign_vars;
use crate::sections::Section;
use crate::Result;

/// A usercss style: source, parsed metadata and, once compiled, sections.
///
/// A style fresh from [`build_meta`] has no sections yet;
/// [`Compiler::build_code`](crate::Compiler::build_code) fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Storage identity of an installed style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Homepage, from `@homepageURL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Where updates come from, from `@updateURL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    /// Source code with `\n` line endings.
    pub source_code: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub usercss_data: UsercssData,
}

impl Style {
    /// A metadata-only style with nothing promoted to the top level.
    pub fn draft(source_code: impl Into<String>, usercss_data: UsercssData) -> Self {
        Self {
            id: None,
            enabled: true,
            name: None,
            author: None,
            description: None,
            url: None,
            update_url: None,
            source_code: source_code.into(),
            sections: Vec::new(),
            usercss_data,
        }
    }

    /// Replace the source of an installed style.
    ///
    /// Identity and the enabled flag are kept, customized variable values are
    /// carried over where they are still valid, and a local `file:` update URL
    /// survives. Sections are cleared until the style is compiled again.
    pub fn rebuild_meta(&mut self, source_code: &str) -> Result<()> {
        let fresh = build_meta(source_code)?;
        let mut next = Style {
            id: self.id,
            enabled: self.enabled,
            update_url: self.update_url.clone(),
            ..Style::draft(fresh.source_code, fresh.usercss_data)
        };
        next.promote_meta();
        assign_vars(&mut next, self);
        *self = next;
        Ok(())
    }

    /// Copy metadata the style keeps at the top level.
    ///
    /// `@updateURL` never replaces a `file:` update URL, which marks a style
    /// installed from disk.
    fn promote_meta(&mut self) {
        for key in MetaKey::ALL {
            let Some(value) = self.usercss_data.key(key).map(str::to_string) else {
                continue;
            };
            match key {
                MetaKey::Name => self.name = Some(value),
                MetaKey::Author => self.author = Some(value),
                MetaKey::Description => self.description = Some(value),
                MetaKey::HomepageUrl => self.url = Some(value),
                MetaKey::UpdateUrl => {
                    let local = self
                        .update_url
                        .as_deref()
                        .is_some_and(|url| url.starts_with("file:"));
                    if !local {
                        self.update_url = Some(value);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Parse the metadata of `source_code` into a draft style.
///
/// Line endings are normalized to `\n`; error offsets refer to the
/// normalized source, which is also what the style stores.
pub fn build_meta(source_code: &str) -> Result<Style> {
    let source_code = normalize_line_endings(source_code).into_owned();
    let parsed = MetaParser::default().parse(&source_code)?;
    let mut style = Style::draft(source_code, parsed.data);
    style.promote_meta();
    Ok(style)
}
