//! The parsed metadata of one style.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vars::VarDef;

use super::directive::MetaKey;

/// Metadata of a usercss style.
///
/// Simple directives are kept as strings in declaration order; a repeated
/// directive keeps its last value. Unknown directives only show up here when
/// parsed with [`UnknownKeyPolicy::Assign`](crate::UnknownKeyPolicy::Assign).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsercssData {
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,
    /// Variables by name, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub vars: IndexMap<String, VarDef>,
}

impl UsercssData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a directive by keyword.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of a known directive.
    pub fn key(&self, key: MetaKey) -> Option<&str> {
        self.get(key.as_str())
    }

    /// Set a directive, keeping its original position when overwritten.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn name(&self) -> Option<&str> {
        self.key(MetaKey::Name)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.key(MetaKey::Namespace)
    }

    pub fn version(&self) -> Option<&str> {
        self.key(MetaKey::Version)
    }

    pub fn author(&self) -> Option<&str> {
        self.key(MetaKey::Author)
    }

    pub fn description(&self) -> Option<&str> {
        self.key(MetaKey::Description)
    }

    pub fn homepage_url(&self) -> Option<&str> {
        self.key(MetaKey::HomepageUrl)
    }

    pub fn update_url(&self) -> Option<&str> {
        self.key(MetaKey::UpdateUrl)
    }

    /// The declared preprocessor, `None` when the style uses plain CSS.
    pub fn preprocessor(&self) -> Option<&str> {
        self.key(MetaKey::Preprocessor)
    }

    /// Look up a variable.
    pub fn var(&self, name: &str) -> Option<&VarDef> {
        self.vars.get(name)
    }

    /// Look up a variable for modification.
    pub fn var_mut(&mut self, name: &str) -> Option<&mut VarDef> {
        self.vars.get_mut(name)
    }
}
