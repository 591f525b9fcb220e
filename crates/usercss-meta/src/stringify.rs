//! Rendering parsed metadata back into a `==UserStyle==` comment.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::metadata::UsercssData;
use crate::vars::{VarDef, VarKind, VarOption};

/// Variable syntax to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringifyFormat {
    /// `@var` declarations with JSON option objects.
    #[default]
    Stylus,
    /// `@advanced` declarations with `<<<EOT` option lists.
    Xstyle,
}

/// Options for [`stringify`].
#[derive(Debug, Clone)]
pub struct StringifyOptions {
    /// Default: [`StringifyFormat::Stylus`].
    pub format: StringifyFormat,
    /// Pad directive keys to a common width. Default: false.
    pub align_keys: bool,
    /// Indentation of option lists. Default: 2.
    pub indent: usize,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            format: StringifyFormat::Stylus,
            align_keys: false,
            indent: 2,
        }
    }
}

impl StringifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: StringifyFormat) -> Self {
        self.format = format;
        self
    }

    pub fn align_keys(mut self, align: bool) -> Self {
        self.align_keys = align;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Render `data` as a `/* ==UserStyle== ... ==/UserStyle== */` comment.
///
/// Simple directives come first in declaration order, variables after them.
/// Any `*/` in a value is escaped as `*\/`.
pub fn stringify(data: &UsercssData, options: &StringifyOptions) -> String {
    let var_key = match options.format {
        StringifyFormat::Stylus => "var",
        StringifyFormat::Xstyle => "advanced",
    };

    let mut lines: Vec<(&str, String)> = data
        .fields
        .iter()
        .map(|(key, value)| (key.as_str(), quote_if_multiline(value)))
        .collect();
    lines.extend(
        data.vars
            .values()
            .map(|var| (var_key, stringify_var(var, options))),
    );

    let width = if options.align_keys {
        lines.iter().map(|(key, _)| key.len()).max().unwrap_or(0)
    } else {
        0
    };
    let body = lines
        .iter()
        .map(|(key, text)| format!("@{key:<width$} {text}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("/* ==UserStyle==\n{}\n==/UserStyle== */", escape_comment(&body))
}

fn stringify_var(var: &VarDef, options: &StringifyOptions) -> String {
    let xstyle = options.format == StringifyFormat::Xstyle;
    let type_name = match &var.kind {
        VarKind::Select { .. } if xstyle => "dropdown",
        kind => kind.type_name(),
    };
    let label = Value::from(var.label.as_str()).to_string();

    let default = match &var.kind {
        VarKind::Select { options: opts } | VarKind::Image { options: opts } if !xstyle => {
            let mut object = Map::new();
            for opt in opts {
                let star = if var.default.as_str() == Some(opt.name.as_str()) { "*" } else { "" };
                object.insert(
                    format!("{}:{}{star}", opt.name, opt.label),
                    Value::from(opt.value.as_str()),
                );
            }
            to_json(&Value::Object(object), options.indent)
        }
        VarKind::Select { options: opts } => stringify_eot(opts, false, options.indent),
        VarKind::Image { options: opts } => stringify_eot(opts, true, options.indent),
        VarKind::Text if xstyle => Value::from(var.default.to_string()).to_string(),
        VarKind::Number(spec) | VarKind::Range(spec) => {
            let mut out: Vec<Value> = [var.default.as_number(), spec.min, spec.max, spec.step]
                .into_iter()
                .map(|n| n.map_or(Value::Null, Value::from))
                .collect();
            if let Some(units) = &spec.units {
                out.push(Value::from(units.as_str()));
            }
            Value::Array(out).to_string()
        }
        _ => var.default.to_string(),
    };
    format!("{type_name} {} {label} {default}", var.name)
}

fn stringify_eot(options: &[VarOption], single_line: bool, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let items: Vec<String> = options
        .iter()
        .map(|o| {
            let label = Value::from(o.label.as_str());
            let value = if single_line {
                Value::from(o.value.as_str()).to_string()
            } else {
                format!("<<<EOT\n{} EOT;", o.value)
            };
            format!("{pad}{} {label} {value}", o.name)
        })
        .collect();
    format!("{{\n{}\n}}", items.join("\n"))
}

fn to_json(value: &Value, indent: usize) -> String {
    if indent == 0 {
        return value.to_string();
    }
    let pad = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

fn quote_if_multiline(value: &str) -> String {
    if value.contains('\n') {
        Value::from(value).to_string()
    } else {
        value.to_string()
    }
}

fn escape_comment(text: &str) -> String {
    text.replace("*/", "*\\/")
}
