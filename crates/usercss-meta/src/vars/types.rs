//! Variable definition types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A variable value: numbers for `number`/`range`, text for everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Number(f64),
    Text(String),
}

impl VarValue {
    /// The text payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for VarValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Format a number the way CSS authors write it: `3`, not `3.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One choice of a `select`, `dropdown` or `image` variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarOption {
    /// Identifier stored as the variable's value.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Text substituted into the CSS when this option is chosen.
    pub value: String,
}

impl VarOption {
    /// Create an option.
    pub fn new(name: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Bounds and units of a `number` or `range` variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub units: Option<String>,
}

/// The type of a variable with its type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VarKind {
    /// Free text.
    Text,
    /// A CSS color, stored in canonical `rgb(...)` form.
    Color,
    /// `"0"` or `"1"`.
    Checkbox,
    /// One of a list of options. `@advanced dropdown` declares one too.
    #[serde(alias = "dropdown")]
    Select { options: Vec<VarOption> },
    /// One of a list of image URLs.
    Image { options: Vec<VarOption> },
    /// A number without a slider.
    Number(RangeSpec),
    /// A number with a slider.
    Range(RangeSpec),
}

impl VarKind {
    /// The type name as written in `@var` directives.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Color => "color",
            Self::Checkbox => "checkbox",
            Self::Select { .. } => "select",
            Self::Image { .. } => "image",
            Self::Number(_) => "number",
            Self::Range(_) => "range",
        }
    }

    /// Options of a select or image variable.
    pub fn options(&self) -> Option<&[VarOption]> {
        match self {
            Self::Select { options } | Self::Image { options } => Some(options),
            _ => None,
        }
    }

    /// Bounds of a number or range variable.
    pub fn range(&self) -> Option<&RangeSpec> {
        match self {
            Self::Number(spec) | Self::Range(spec) => Some(spec),
            _ => None,
        }
    }
}

/// A parsed variable definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    /// Identifier used in the CSS.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    #[serde(flatten)]
    pub kind: VarKind,
    /// Declared default.
    pub default: VarValue,
    /// User customization; `None` means the default is in effect.
    #[serde(default)]
    pub value: Option<VarValue>,
}

impl VarDef {
    /// Create a definition with no customized value.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: VarKind, default: VarValue) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default,
            value: None,
        }
    }

    /// The type name as written in `@var` directives.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// `value` if customized, else `default`.
    pub fn current(&self) -> &VarValue {
        self.value.as_ref().unwrap_or(&self.default)
    }

    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&VarOption> {
        self.kind.options()?.iter().find(|o| o.name == name)
    }

    /// The effective value as it is substituted into CSS.
    ///
    /// Select and image variables resolve to the chosen option's `value`;
    /// numbers get their units appended. A customized value that names no
    /// option falls back to the default.
    pub fn effective_value(&self) -> String {
        match &self.kind {
            VarKind::Select { .. } | VarKind::Image { .. } => {
                let chosen = self.current().as_str().and_then(|n| self.option(n));
                chosen
                    .or_else(|| self.default.as_str().and_then(|n| self.option(n)))
                    .map(|o| o.value.clone())
                    .unwrap_or_default()
            }
            VarKind::Number(spec) | VarKind::Range(spec) => {
                let mut out = self.current().to_string();
                if let Some(units) = &spec.units {
                    out.push_str(units);
                }
                out
            }
            _ => self.current().to_string(),
        }
    }
}
