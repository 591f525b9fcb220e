//! `/*[[name]]*/` placeholder substitution for the `uso` preprocessor.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use usercss_meta::color::Rgba;
use usercss_meta::vars::{VarDef, VarKind};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\*\[\[([0-9A-Za-z_-]+)\]\]\*/([0-9a-fA-F]{2})?")
        .expect("placeholder pattern is valid")
});

/// Replace every `/*[[name]]*/` in `source` with the variable's value.
///
/// - colors become `#rrggbb`, or `rgba(...)` when translucent
/// - `/*[[name]]*/80` is an inline alpha: the color becomes `#rrggbb` and the
///   two hex digits stay after it
/// - `name-rgb` refers to color `name` and becomes `r, g, b`
/// - select values may contain placeholders themselves; a variable that
///   refers back to itself resolves to an empty string
///
/// Unknown names and unparseable colors leave the placeholder in place.
pub fn substitute(source: &str, vars: &IndexMap<String, VarDef>) -> String {
    Substitution {
        vars,
        pool: HashMap::new(),
    }
    .replace(source)
}

struct Substitution<'a> {
    vars: &'a IndexMap<String, VarDef>,
    pool: HashMap<String, String>,
}

impl Substitution<'_> {
    fn replace(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let comment_end = caps.get(2).map_or(whole.end(), |hex| hex.start());
            // an alpha suffix must not run into a longer word
            let alpha = caps
                .get(2)
                .filter(|hex| {
                    text[hex.end()..]
                        .chars()
                        .next()
                        .is_some_and(|c| !c.is_ascii_alphanumeric() && c != '_')
                })
                .map(|hex| hex.as_str());

            let key = match alpha {
                Some(_) => format!("{name}[A]"),
                None => name.to_string(),
            };
            if !self.pool.contains_key(&key) {
                let value = self
                    .value_of(name, alpha.is_some())
                    .unwrap_or_else(|| text[whole.start()..comment_end].to_string());
                self.pool.insert(key.clone(), value);
            }

            out.push_str(&text[last..whole.start()]);
            out.push_str(self.pool.get(&key).map_or("", String::as_str));
            last = comment_end;
            if let Some(alpha) = alpha {
                out.push_str(alpha);
                last += alpha.len();
            }
        }
        out.push_str(&text[last..]);
        out
    }

    fn value_of(&mut self, name: &str, inline_alpha: bool) -> Option<String> {
        let vars = self.vars;
        let (var, channels) = match vars.get(name) {
            Some(var) => (var, false),
            None => (vars.get(name.strip_suffix("-rgb")?)?, true),
        };
        let value = var.effective_value();
        match var.kind {
            VarKind::Color => {
                let color = Rgba::parse(&value)?;
                Some(if channels {
                    color.channels()
                } else if inline_alpha || color.is_opaque() {
                    color.to_hex_string()
                } else {
                    color.to_rgb_string()
                })
            }
            VarKind::Select { .. } => {
                self.pool.insert(name.to_string(), String::new());
                Some(self.replace(&value))
            }
            _ => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usercss_meta::vars::{VarOption, VarValue};

    fn vars(defs: Vec<VarDef>) -> IndexMap<String, VarDef> {
        defs.into_iter().map(|v| (v.name.clone(), v)).collect()
    }

    fn color(name: &str, value: &str) -> VarDef {
        VarDef::new(name, name, VarKind::Color, VarValue::from(value))
    }

    fn select(name: &str, options: Vec<VarOption>) -> VarDef {
        let default = VarValue::from(options[0].name.as_str());
        VarDef::new(name, name, VarKind::Select { options }, default)
    }

    #[test]
    fn colors_and_channels() {
        let vars = vars(vec![color("accent", "rgb(17, 34, 51)")]);
        let css = substitute("a { color: /*[[accent]]*/; background: rgba(/*[[accent-rgb]]*/, .5) }", &vars);
        assert_eq!(css, "a { color: #112233; background: rgba(17, 34, 51, .5) }");
    }

    #[test]
    fn translucent_color_keeps_alpha() {
        let vars = vars(vec![color("shade", "rgba(0, 0, 0, 0.5)")]);
        assert_eq!(substitute("/*[[shade]]*/", &vars), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn unknown_names_are_left_alone() {
        let vars = vars(vec![color("bad", "nope")]);
        assert_eq!(
            substitute("/*[[missing]]*/ /*[[bad]]*/", &vars),
            "/*[[missing]]*/ /*[[bad]]*/"
        );
    }

    #[test]
    fn nested_select_values() {
        let vars = vars(vec![
            color("fg", "#ffffff"),
            select("theme", vec![VarOption::new("a", "A", "color: /*[[fg]]*/;")]),
        ]);
        assert_eq!(substitute("b { /*[[theme]]*/ }", &vars), "b { color: #ffffff; }");
    }

    #[test]
    fn self_reference_resolves_to_empty() {
        let vars = vars(vec![select(
            "loop",
            vec![VarOption::new("a", "A", "x/*[[loop]]*/y")],
        )]);
        assert_eq!(substitute("[/*[[loop]]*/]", &vars), "[xy]");
    }

    #[test]
    fn text_values_are_inserted_verbatim() {
        let vars = vars(vec![VarDef::new("font", "Font", VarKind::Text, "Arial".into())]);
        assert_eq!(substitute("font-family: /*[[font]]*/", &vars), "font-family: Arial");
    }

    #[test]
    fn inline_alpha_suffix() {
        let vars = vars(vec![color("shade", "rgba(16, 32, 48, 0.5)")]);
        assert_eq!(
            substitute("a { color: /*[[shade]]*/80; b: /*[[shade]]*/ }", &vars),
            "a { color: #10203080; b: rgba(16, 32, 48, 0.5) }"
        );
    }

    #[test]
    fn hex_digits_inside_a_word_are_not_alpha() {
        let vars = vars(vec![color("fg", "rgba(0, 0, 0, 0.5)")]);
        assert_eq!(substitute("/*[[fg]]*/80px", &vars), "rgba(0, 0, 0, 0.5)80px");
        // end of input is not a word boundary either
        assert_eq!(substitute("/*[[fg]]*/ff", &vars), "rgba(0, 0, 0, 0.5)ff");
    }

    #[test]
    fn alpha_suffix_on_unknown_name_is_kept() {
        let vars = vars(Vec::new());
        assert_eq!(substitute("/*[[nope]]*/ff;", &vars), "/*[[nope]]*/ff;");
    }
}
