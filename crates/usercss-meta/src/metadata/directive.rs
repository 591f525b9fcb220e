//! Known metadata directives.

use crate::vars::VarDirective;

/// A simple `@key value` directive that reads to the end of its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    Name,
    Namespace,
    Version,
    Author,
    Description,
    HomepageUrl,
    SupportUrl,
    UpdateUrl,
    License,
    Preprocessor,
    Icon,
}

impl MetaKey {
    /// Every simple directive, in canonical order.
    pub const ALL: [MetaKey; 11] = [
        Self::Name,
        Self::Namespace,
        Self::Version,
        Self::Author,
        Self::Description,
        Self::HomepageUrl,
        Self::SupportUrl,
        Self::UpdateUrl,
        Self::License,
        Self::Preprocessor,
        Self::Icon,
    ];

    /// The directive keyword without `@`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Namespace => "namespace",
            Self::Version => "version",
            Self::Author => "author",
            Self::Description => "description",
            Self::HomepageUrl => "homepageURL",
            Self::SupportUrl => "supportURL",
            Self::UpdateUrl => "updateURL",
            Self::License => "license",
            Self::Preprocessor => "preprocessor",
            Self::Icon => "icon",
        }
    }

    /// Look up a keyword. Matching is case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Whether the value must be an http(s) URL.
    pub fn is_url(self) -> bool {
        matches!(self, Self::HomepageUrl | Self::SupportUrl | Self::UpdateUrl)
    }
}

/// What a directive keyword dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Key(MetaKey),
    Var(VarDirective),
}

impl Directive {
    /// Resolve a keyword. `None` means the directive is unknown.
    pub fn lookup(key: &str) -> Option<Self> {
        match key {
            "var" => Some(Self::Var(VarDirective::Var)),
            "advanced" => Some(Self::Var(VarDirective::Advanced)),
            _ => MetaKey::from_key(key).map(Self::Key),
        }
    }

    /// Every known keyword, simple keys first.
    pub fn keywords() -> impl Iterator<Item = &'static str> {
        MetaKey::ALL
            .into_iter()
            .map(MetaKey::as_str)
            .chain([VarDirective::Advanced.as_str(), VarDirective::Var.as_str()])
    }
}
