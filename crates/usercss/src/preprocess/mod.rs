//! Preprocessor dispatch and variable substitution.

mod default;
mod engine;
mod uso;

use indexmap::IndexMap;
use usercss_meta::vars::VarDef;

pub use default::inject_vars;
pub use engine::{EngineRegistry, PreprocessorEngine, PreprocessorError};
pub use uso::substitute as substitute_uso;

/// How a style's source becomes CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preprocessor {
    /// Plain CSS; variables become custom properties on `:root`.
    Default,
    /// `/*[[name]]*/` placeholders.
    Uso,
    /// Stylus, compiled by a registered engine.
    Stylus,
    /// Less, compiled by a registered engine.
    Less,
}

impl Preprocessor {
    /// Resolve the `@preprocessor` value of a style.
    ///
    /// A missing value means plain CSS. An unrecognized name falls back to
    /// plain CSS with a warning.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            None | Some("default") => Self::Default,
            Some("uso") => Self::Uso,
            Some("stylus") => Self::Stylus,
            Some("less") => Self::Less,
            Some(other) => {
                tracing::warn!(
                    target: "usercss::preprocess",
                    preprocessor = other,
                    "unknown preprocessor, compiling as plain CSS"
                );
                Self::Default
            }
        }
    }

    /// The `@preprocessor` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Uso => "uso",
            Self::Stylus => "stylus",
            Self::Less => "less",
        }
    }

    /// Whether compilation needs an external [`PreprocessorEngine`].
    pub fn needs_engine(self) -> bool {
        matches!(self, Self::Stylus | Self::Less)
    }

    /// Variable definitions in this preprocessor's syntax, one per line.
    ///
    /// Empty for preprocessors that do not take a prelude.
    pub fn var_prelude(self, vars: &IndexMap<String, VarDef>) -> String {
        let line = |name: &str, value: String| match self {
            Self::Stylus => format!("{name} = {value};\n"),
            Self::Less => format!("@{name}:{value};\n"),
            Self::Default | Self::Uso => String::new(),
        };
        vars.iter()
            .map(|(name, var)| line(name, var.effective_value()))
            .collect()
    }
}

/// Effective value of every variable, as substituted into CSS.
pub fn effective_vars(vars: &IndexMap<String, VarDef>) -> IndexMap<String, String> {
    vars.iter()
        .map(|(name, var)| (name.clone(), var.effective_value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use usercss_meta::vars::{VarKind, VarValue};

    fn vars() -> IndexMap<String, VarDef> {
        let mut vars = IndexMap::new();
        vars.insert(
            "bg".to_string(),
            VarDef::new("bg", "Bg", VarKind::Color, VarValue::from("rgb(0, 0, 0)")),
        );
        let mut on = VarDef::new("on", "On", VarKind::Checkbox, VarValue::from("0"));
        on.value = Some("1".into());
        vars.insert("on".to_string(), on);
        vars
    }

    #[test]
    fn names() {
        assert_eq!(Preprocessor::from_name(None), Preprocessor::Default);
        assert_eq!(Preprocessor::from_name(Some("less")), Preprocessor::Less);
        assert_eq!(Preprocessor::from_name(Some("sass")), Preprocessor::Default);
        assert!(Preprocessor::Stylus.needs_engine());
        assert!(!Preprocessor::Uso.needs_engine());
    }

    #[test]
    fn preludes() {
        assert_eq!(Preprocessor::Stylus.var_prelude(&vars()), "bg = rgb(0, 0, 0);\non = 1;\n");
        assert_eq!(Preprocessor::Less.var_prelude(&vars()), "@bg:rgb(0, 0, 0);\n@on:1;\n");
        assert_eq!(Preprocessor::Default.var_prelude(&vars()), "");
    }

    #[test]
    fn effective_values_prefer_customization() {
        let effective = effective_vars(&vars());
        assert_eq!(effective["on"], "1");
        assert_eq!(effective["bg"], "rgb(0, 0, 0)");
    }
}
