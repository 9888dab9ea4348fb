use std::collections::BTreeSet;

use ext_meta::{ConfigValue, Constraint, SetMatching};

use super::{Check, check_equal};

pub(super) fn bounds(value: &ConfigValue, choices: &[String]) -> Option<String> {
    let items = value.as_set()?;
    let outside: Vec<&str> = items
        .into_iter()
        .filter(|item| !choices.iter().any(|c| c == item))
        .collect();
    (!outside.is_empty()).then(|| format!("value {value} contains elements outside the choices: [{}]", outside.join(", ")))
}

pub(super) fn check(value: &ConfigValue, constraint: &Constraint) -> Check {
    let Some(items) = value.as_set() else {
        return Check::Inapplicable;
    };
    match constraint {
        Constraint::Value(expected) => check_equal(value, expected),
        Constraint::Values { values, matching } => {
            let wanted: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            match matching {
                SetMatching::Exclusive if items != wanted => Check::Fail(format!(
                    "value {value} does not exactly match [{}]",
                    values.join(", ")
                )),
                SetMatching::Inclusive => {
                    let missing: Vec<&str> = wanted.difference(&items).copied().collect();
                    if missing.is_empty() {
                        Check::Pass
                    } else {
                        Check::Fail(format!("value {value} is missing [{}]", missing.join(", ")))
                    }
                }
                SetMatching::Exclusive => Check::Pass,
            }
        }
        Constraint::Range { .. } => Check::Inapplicable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn values(items: &[&str], matching: SetMatching) -> Constraint {
        Constraint::Values {
            values: items.iter().map(|s| s.to_string()).collect(),
            matching,
        }
    }

    #[rstest]
    #[case(&["a", "b"], SetMatching::Inclusive, true)]
    #[case(&["a"], SetMatching::Inclusive, true)]
    #[case(&["a", "c"], SetMatching::Inclusive, false)]
    #[case(&["b", "a"], SetMatching::Exclusive, true)]
    #[case(&["a"], SetMatching::Exclusive, false)]
    fn test_values_matching(#[case] wanted: &[&str], #[case] matching: SetMatching, #[case] pass: bool) {
        let value = ConfigValue::from(vec!["a", "b"]);
        assert_eq!(matches!(check(&value, &values(wanted, matching)), Check::Pass), pass);
    }

    #[test]
    fn test_missing_elements_reason() {
        let value = ConfigValue::from(vec!["a"]);
        match check(&value, &values(&["a", "c", "b"], SetMatching::Inclusive)) {
            Check::Fail(reason) => assert_eq!(reason, "value [a] is missing [b, c]"),
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn test_bounds_name_outside_elements() {
        let choices = vec!["a".to_string(), "b".to_string()];
        let value = ConfigValue::from(vec!["a", "z"]);
        assert_eq!(
            bounds(&value, &choices).as_deref(),
            Some("value [a, z] contains elements outside the choices: [z]")
        );
        assert!(bounds(&ConfigValue::from(vec!["b"]), &choices).is_none());
    }
}
