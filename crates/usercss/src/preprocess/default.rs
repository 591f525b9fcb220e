//! CSS custom property injection for plain CSS styles.

use indexmap::IndexMap;
use usercss_meta::vars::VarDef;

use crate::sections::{Section, global_rules_end, style_code_empty};

/// Prepend a `:root { --name: value; }` block to every section with code.
///
/// The block goes after the leading `@charset`, `@import` and `@namespace`
/// statements of a section, since those must stay first.
pub fn inject_vars(sections: &mut [Section], vars: &IndexMap<String, VarDef>) {
    if vars.is_empty() {
        return;
    }
    let declarations: String = vars
        .iter()
        .map(|(name, var)| format!("  --{name}: {};\n", var.effective_value()))
        .collect();
    let block = format!(":root {{\n{declarations}}}\n");

    for section in sections.iter_mut() {
        if style_code_empty(&section.code) {
            continue;
        }
        match global_rules_end(&section.code) {
            0 => section.code.insert_str(0, &block),
            at => section.code.insert_str(at, &format!("\n{block}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usercss_meta::vars::{RangeSpec, VarKind, VarValue};

    fn vars() -> IndexMap<String, VarDef> {
        let size = VarDef::new(
            "size",
            "Size",
            VarKind::Number(RangeSpec {
                units: Some("px".into()),
                ..RangeSpec::default()
            }),
            VarValue::Number(4.0),
        );
        IndexMap::from([("size".to_string(), size)])
    }

    #[test]
    fn prepends_root_block() {
        let mut sections = vec![Section::global("a { margin: var(--size) }")];
        inject_vars(&mut sections, &vars());
        assert_eq!(sections[0].code, ":root {\n  --size: 4px;\n}\na { margin: var(--size) }");
    }

    #[test]
    fn skips_empty_sections_and_leading_rules() {
        let mut sections = vec![
            Section::global("/* only a comment */"),
            Section::global("@import url(a.css);\nb {}"),
        ];
        inject_vars(&mut sections, &vars());
        assert_eq!(sections[0].code, "/* only a comment */");
        assert_eq!(
            sections[1].code,
            "@import url(a.css);\n:root {\n  --size: 4px;\n}\n\nb {}"
        );
    }

    #[test]
    fn no_vars_no_block() {
        let mut sections = vec![Section::global("a {}")];
        inject_vars(&mut sections, &IndexMap::new());
        assert_eq!(sections[0].code, "a {}");
    }
}
