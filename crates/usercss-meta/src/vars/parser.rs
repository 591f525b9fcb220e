//! `@var` / `@advanced` declaration grammar.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::scanner::Scanner;

use super::types::{RangeSpec, VarDef, VarKind, VarOption, VarValue};
use super::validate::{Checked, validate_var};

static OPTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Za-z_]+):(.*)$").expect("option name pattern is valid"));

/// The directive a variable is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarDirective {
    /// `@var`, the stylus-style syntax.
    Var,
    /// `@advanced`, the legacy xStyle syntax.
    Advanced,
}

impl VarDirective {
    /// The directive keyword without `@`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaredType {
    Text,
    Color,
    Checkbox,
    Select,
    Dropdown,
    Image,
    Number,
    Range,
}

impl DeclaredType {
    fn lookup(word: &str, directive: VarDirective) -> Option<Self> {
        Some(match word {
            "text" => Self::Text,
            "color" => Self::Color,
            "checkbox" => Self::Checkbox,
            "select" => Self::Select,
            "dropdown" if directive == VarDirective::Advanced => Self::Dropdown,
            "image" => Self::Image,
            "number" => Self::Number,
            "range" => Self::Range,
            _ => return None,
        })
    }
}

/// Parse one variable declaration starting right after the directive keyword.
///
/// The default is validated before returning, so color defaults come back in
/// canonical `rgb(...)` form.
pub fn parse_var(scanner: &mut Scanner<'_>, directive: VarDirective) -> Result<VarDef> {
    let type_pos = scanner.position();
    let type_word = scanner.parse_word("type")?;
    let declared = DeclaredType::lookup(&type_word, directive).ok_or_else(|| {
        scanner.error_at(
            ParseErrorKind::UnknownVarType {
                directive: directive.as_str().to_string(),
                ty: type_word.clone(),
            },
            type_pos,
        )
    })?;

    let name = scanner.parse_word("name")?;
    let label = scanner.parse_string(true)?;

    let value_index = scanner.base() + scanner.position();
    let (kind, default) = match declared {
        DeclaredType::Text => (VarKind::Text, VarValue::Text(scanner.parse_string_to_end()?)),
        DeclaredType::Color => (VarKind::Color, VarValue::Text(scanner.parse_string_to_end()?)),
        DeclaredType::Checkbox => (VarKind::Checkbox, parse_checkbox(scanner)?),
        DeclaredType::Select => {
            let (options, default) = parse_select(scanner).map_err(|e| e.or_at(value_index))?;
            (VarKind::Select { options }, default)
        }
        DeclaredType::Image if directive == VarDirective::Var => {
            let (options, default) = parse_select(scanner).map_err(|e| e.or_at(value_index))?;
            (VarKind::Image { options }, default)
        }
        DeclaredType::Image => {
            let (options, default) = parse_option_list(scanner, OptionValue::Quoted)?;
            (VarKind::Image { options }, default)
        }
        DeclaredType::Dropdown => {
            let (options, default) = parse_option_list(scanner, OptionValue::Eot)?;
            (VarKind::Select { options }, default)
        }
        DeclaredType::Number => {
            let (spec, default) = parse_range(scanner, "number")?;
            (VarKind::Number(spec), default)
        }
        DeclaredType::Range => {
            let (spec, default) = parse_range(scanner, "range")?;
            (VarKind::Range(spec), default)
        }
    };

    let mut var = VarDef::new(name, label, kind, default);
    validate_var(&mut var, Checked::Default).map_err(|e| e.or_at(value_index))?;
    Ok(var)
}

fn parse_checkbox(scanner: &mut Scanner<'_>) -> Result<VarValue> {
    let pos = scanner.position();
    let c = scanner.parse_char()?;
    if scanner.peek().is_some_and(|next| !next.is_whitespace()) {
        return Err(scanner.error_at(ParseErrorKind::InvalidCheckboxDefault, pos));
    }
    scanner.eat_whitespace();
    Ok(VarValue::Text(c.to_string()))
}

/// `[default, min, max, step]` with an optional unit string anywhere, or a
/// bare number.
fn parse_range(scanner: &mut Scanner<'_>, type_name: &str) -> Result<(RangeSpec, VarValue)> {
    let index = scanner.base() + scanner.position();
    let fail = |kind| ParseError::new(kind, index);
    let mut spec = RangeSpec::default();
    let default = match scanner.parse_json()? {
        Value::Number(n) => n.as_f64(),
        Value::Array(items) => {
            let mut slots: [Option<f64>; 4] = [None; 4];
            let mut filled = 0;
            for item in items {
                let slot = match item {
                    Value::String(units) => {
                        if spec.units.is_some() {
                            return Err(fail(ParseErrorKind::InvalidRangeMultipleUnits));
                        }
                        spec.units = Some(units);
                        continue;
                    }
                    Value::Number(n) => n.as_f64(),
                    Value::Null => None,
                    _ => return Err(fail(ParseErrorKind::InvalidRangeValue)),
                };
                if filled >= slots.len() {
                    return Err(fail(ParseErrorKind::InvalidRangeTooManyValues));
                }
                slots[filled] = slot;
                filled += 1;
            }
            let [default, min, max, step] = slots;
            spec.min = min;
            spec.max = max;
            spec.step = step.map(|s| if s == 0.0 { 1.0 } else { s });
            default
        }
        _ => {
            return Err(fail(ParseErrorKind::InvalidRange(type_name.to_string())));
        }
    };
    spec.units = spec.units.as_deref().and_then(clean_units);
    let default =
        default.ok_or_else(|| fail(ParseErrorKind::InvalidRangeDefault(type_name.to_string())))?;
    Ok((spec, VarValue::Number(default)))
}

/// Drop digits, signs and decimal points from a unit string: `"10px"` → `px`.
fn clean_units(raw: &str) -> Option<String> {
    let units: String = raw
        .chars()
        .filter(|c| !c.is_ascii_digit() && !matches!(c, '-' | '+' | '.'))
        .collect();
    let units = units.trim();
    (!units.is_empty()).then(|| units.to_string())
}

/// A JSON object (`{"name:label*": "value"}`) or array (`["name:label*"]`).
fn parse_select(scanner: &mut Scanner<'_>) -> Result<(Vec<VarOption>, VarValue)> {
    let candidates = match scanner.parse_json()? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| create_option(&item, None))
            .collect::<Result<Vec<_>>>()?,
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| create_option(&Value::String(key.clone()), Some(value)))
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(ParseErrorKind::InvalidSelect.into()),
    };

    if candidates.is_empty() {
        return Err(ParseErrorKind::InvalidSelectEmptyOptions.into());
    }
    let mut seen = HashSet::new();
    if !candidates.iter().all(|(o, _)| seen.insert(o.name.as_str())) {
        return Err(ParseErrorKind::InvalidSelectNameDuplicated.into());
    }
    let mut defaults = candidates.iter().filter(|(_, starred)| *starred);
    let default = match (defaults.next(), defaults.next()) {
        (Some(_), Some(_)) => return Err(ParseErrorKind::InvalidSelectMultipleDefaults.into()),
        (Some((o, _)), None) => o.name.clone(),
        (None, _) => candidates[0].0.name.clone(),
    };
    let options = candidates.into_iter().map(|(o, _)| o).collect();
    Ok((options, VarValue::Text(default)))
}

/// Build an option from a `name:label*` key. Returns whether it was starred.
fn create_option(key: &Value, value: Option<&Value>) -> Result<(VarOption, bool)> {
    let Value::String(key) = key else {
        return Err(ParseErrorKind::InvalidSelectValue.into());
    };
    let value = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ParseErrorKind::InvalidSelectValue.into()),
    };

    let (key, starred) = match key.strip_suffix('*') {
        Some(stripped) => (stripped, true),
        None => (key.as_str(), false),
    };
    let (name, label) = match OPTION_NAME.captures(key) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (key.to_string(), key.to_string()),
    };
    if label.is_empty() {
        return Err(ParseErrorKind::InvalidSelectLabel.into());
    }
    let value = value.unwrap_or_else(|| name.clone());
    Ok((VarOption { name, label, value }, starred))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionValue {
    /// `<<<EOT ... EOT;` raw text.
    Eot,
    /// A quoted string.
    Quoted,
}

/// The xStyle brace list: `{ name "Label" <value> ... }`.
fn parse_option_list(
    scanner: &mut Scanner<'_>,
    style: OptionValue,
) -> Result<(Vec<VarOption>, VarValue)> {
    let open = scanner.position();
    if scanner.peek() != Some('{') {
        return Err(scanner.error_at(ParseErrorKind::MissingChar(vec!['{']), open));
    }
    scanner.set_position(open + 1);
    scanner.eat_whitespace();

    let mut options = Vec::new();
    loop {
        match scanner.peek() {
            Some('}') => break,
            None => {
                let end = scanner.position();
                return Err(scanner.error_at(ParseErrorKind::MissingChar(vec!['}']), end));
            }
            Some(_) => {}
        }
        let name = scanner.parse_string_unquoted();
        let label = scanner.parse_string(false)?;
        let value = match style {
            OptionValue::Eot => scanner.parse_eot()?,
            OptionValue::Quoted => scanner.parse_string(false)?,
        };
        options.push(VarOption { name, label, value });
    }
    scanner.set_position(scanner.position() + 1);
    scanner.eat_whitespace();

    let default = options
        .first()
        .map(|o| VarValue::Text(o.name.clone()))
        .ok_or_else(|| scanner.error_at(ParseErrorKind::InvalidSelectEmptyOptions, open))?;
    Ok((options, default))
}
