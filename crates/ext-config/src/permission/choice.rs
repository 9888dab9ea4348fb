use ext_meta::{ConfigValue, Constraint};

use super::{Check, check_equal};

pub(super) fn bounds(value: &str, choices: &[String]) -> Option<String> {
    (!choices.iter().any(|c| c == value))
        .then(|| format!("value (\"{value}\") is not one of the choices [{}]", choices.join(", ")))
}

/// `Values` on a choice lists the acceptable choices.
pub(super) fn check(value: &str, constraint: &Constraint) -> Check {
    match constraint {
        Constraint::Value(expected) => check_equal(&ConfigValue::from(value), expected),
        Constraint::Values { values, .. } => {
            if values.iter().any(|v| v == value) {
                Check::Pass
            } else {
                Check::Fail(format!("value (\"{value}\") is not one of [{}]", values.join(", ")))
            }
        }
        Constraint::Range { .. } => Check::Inapplicable,
    }
}
