//! Booleans, strings and file paths only take `Value` constraints.

use ext_meta::{ConfigValue, Constraint};

use super::{Check, check_equal};

pub(super) fn check(value: &ConfigValue, constraint: &Constraint) -> Check {
    match constraint {
        Constraint::Value(expected) => check_equal(value, expected),
        Constraint::Range { .. } | Constraint::Values { .. } => Check::Inapplicable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_value() {
        let required = Constraint::Value(ConfigValue::from(true));
        assert!(matches!(check(&ConfigValue::from(true), &required), Check::Pass));
        match check(&ConfigValue::from(false), &required) {
            Check::Fail(reason) => assert_eq!(reason, "value (false) does not match the value (true)"),
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn test_range_on_text_is_inapplicable() {
        let range = Constraint::Range {
            min: Some(1.0),
            max: None,
        };
        assert!(matches!(check(&ConfigValue::from("x"), &range), Check::Inapplicable));
    }
}
