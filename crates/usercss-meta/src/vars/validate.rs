//! Per-type validation of variable values.

use crate::color::normalize_color;
use crate::error::{ParseError, ParseErrorKind, Result};

use super::types::{RangeSpec, VarDef, VarKind, VarValue};

/// CSS units accepted as `number`/`range` suffixes.
pub const UNITS: &[&str] = &[
    "em", "ex", "cap", "ch", "ic", "rem", "lh", "rlh", "vw", "vh", "vi", "vb", "vmin", "vmax",
    "cm", "mm", "Q", "in", "pt", "pc", "px", "deg", "grad", "rad", "turn", "s", "ms", "Hz", "kHz",
    "dpi", "dpcm", "dppx", "%",
];

/// Which field of a [`VarDef`] to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checked {
    /// The declared default.
    Default,
    /// The customized value; a missing value passes.
    Value,
}

/// Validate one field of `var` against its type.
///
/// Color fields are rewritten to their canonical `rgb(...)` form on success.
pub fn validate_var(var: &mut VarDef, which: Checked) -> Result<()> {
    let VarDef {
        kind,
        default,
        value,
        ..
    } = var;
    let field = match which {
        Checked::Default => default,
        Checked::Value => match value.as_mut() {
            Some(v) => v,
            None => return Ok(()),
        },
    };
    check_value(kind, field).map_err(ParseError::unpositioned)
}

fn check_value(kind: &VarKind, field: &mut VarValue) -> std::result::Result<(), ParseErrorKind> {
    match kind {
        VarKind::Text => Ok(()),
        VarKind::Color => {
            let raw = field.to_string();
            let canonical = normalize_color(&raw).ok_or(ParseErrorKind::InvalidColor(raw))?;
            *field = VarValue::Text(canonical);
            Ok(())
        }
        VarKind::Checkbox => match field.as_str() {
            Some("0" | "1") => Ok(()),
            _ => Err(ParseErrorKind::InvalidCheckboxDefault),
        },
        VarKind::Select { options } | VarKind::Image { options } => {
            let name = field.to_string();
            if field.as_str().is_some() && options.iter().any(|o| o.name == name) {
                Ok(())
            } else {
                Err(ParseErrorKind::InvalidSelectValueMismatch(name))
            }
        }
        VarKind::Number(spec) | VarKind::Range(spec) => {
            let n = field
                .as_number()
                .ok_or_else(|| ParseErrorKind::InvalidRangeDefault(kind.type_name().to_string()))?;
            check_range(n, spec)
        }
    }
}

fn check_range(n: f64, spec: &RangeSpec) -> std::result::Result<(), ParseErrorKind> {
    if spec.min.is_some_and(|min| n < min) {
        return Err(ParseErrorKind::InvalidRangeMin);
    }
    if spec.max.is_some_and(|max| n > max) {
        return Err(ParseErrorKind::InvalidRangeMax);
    }
    if let Some(step) = spec.step {
        let off_step = [Some(n), spec.min, spec.max]
            .into_iter()
            .flatten()
            .any(|x| !is_multiple_of(x, step));
        if off_step {
            return Err(ParseErrorKind::InvalidRangeStep);
        }
    }
    if let Some(units) = &spec.units {
        if !UNITS.contains(&units.as_str()) {
            return Err(ParseErrorKind::InvalidRangeUnits(units.clone()));
        }
    }
    Ok(())
}

/// Whether `value` is a multiple of `step`, within double precision.
fn is_multiple_of(value: f64, step: f64) -> bool {
    let n = (value / step).abs();
    let rounded = n.round();
    // a double holds ~15 significant digits; the integer part uses some of them
    let digits = format!("{rounded}").len() as i32;
    (n - rounded).abs() < 10f64.powi(digits - 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::types::VarOption;

    fn range(min: Option<f64>, max: Option<f64>, step: Option<f64>) -> VarKind {
        VarKind::Range(RangeSpec {
            min,
            max,
            step,
            units: None,
        })
    }

    #[test]
    fn color_is_canonicalized() {
        let mut var = VarDef::new("c", "C", VarKind::Color, "#ABC".into());
        validate_var(&mut var, Checked::Default).unwrap();
        assert_eq!(var.default, VarValue::from("rgb(170, 187, 204)"));
    }

    #[test]
    fn checkbox_accepts_only_bits() {
        let mut var = VarDef::new("c", "C", VarKind::Checkbox, "1".into());
        assert!(validate_var(&mut var, Checked::Default).is_ok());
        var.value = Some("yes".into());
        let err = validate_var(&mut var, Checked::Value).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidCheckboxDefault);
    }

    #[test]
    fn missing_value_passes() {
        let mut var = VarDef::new("c", "C", VarKind::Checkbox, "1".into());
        assert!(validate_var(&mut var, Checked::Value).is_ok());
    }

    #[test]
    fn select_requires_known_option() {
        let mut var = VarDef::new(
            "s",
            "S",
            VarKind::Select {
                options: vec![VarOption::new("a", "A", "a")],
            },
            "a".into(),
        );
        assert!(validate_var(&mut var, Checked::Default).is_ok());
        var.value = Some("z".into());
        assert_eq!(
            validate_var(&mut var, Checked::Value).unwrap_err().kind,
            ParseErrorKind::InvalidSelectValueMismatch("z".into())
        );
    }

    #[test]
    fn numbers_must_be_numbers() {
        let mut var = VarDef::new("n", "N", range(None, None, None), "5".into());
        assert_eq!(
            validate_var(&mut var, Checked::Default).unwrap_err().kind,
            ParseErrorKind::InvalidRangeDefault("range".into())
        );
    }

    #[test]
    fn range_bounds_and_step() {
        let kind = range(Some(0.0), Some(10.0), Some(0.1));
        let mut var = VarDef::new("n", "N", kind, 0.3.into());
        assert!(validate_var(&mut var, Checked::Default).is_ok());

        var.value = Some(11.0.into());
        assert_eq!(validate_var(&mut var, Checked::Value).unwrap_err().kind, ParseErrorKind::InvalidRangeMax);
        var.value = Some((-1.0).into());
        assert_eq!(validate_var(&mut var, Checked::Value).unwrap_err().kind, ParseErrorKind::InvalidRangeMin);
        var.value = Some(0.35.into());
        assert_eq!(validate_var(&mut var, Checked::Value).unwrap_err().kind, ParseErrorKind::InvalidRangeStep);
    }

    #[test]
    fn unknown_units() {
        let kind = VarKind::Number(RangeSpec {
            units: Some("furlong".into()),
            ..RangeSpec::default()
        });
        let mut var = VarDef::new("n", "N", kind, 1.0.into());
        assert_eq!(
            validate_var(&mut var, Checked::Default).unwrap_err().kind,
            ParseErrorKind::InvalidRangeUnits("furlong".into())
        );
    }
}
