//! Carrying customized variable values over to a new version of a style.

use usercss_meta::vars::{Checked, validate_var};

use crate::style::Style;

/// Copy the customized value of every variable `old` shares with `style`.
///
/// Each copied value is validated against the new definition; one that no
/// longer fits (a removed option, a changed type) is dropped so the variable
/// falls back to its default. Variables only one side has are left alone.
pub fn assign_vars(style: &mut Style, old: &Style) {
    for (name, var) in style.usercss_data.vars.iter_mut() {
        let Some(value) = old.usercss_data.var(name).and_then(|v| v.value.clone()) else {
            continue;
        };
        var.value = Some(value);
        if let Err(err) = validate_var(var, Checked::Value) {
            tracing::debug!(
                target: "usercss::reconcile",
                var = %name,
                error = %err,
                "dropping saved value that no longer validates"
            );
            var.value = None;
        }
    }
}
