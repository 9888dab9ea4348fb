use ext_meta::value::format_number;
use ext_meta::{ConfigValue, Constraint};

use super::{Check, check_equal};

pub(super) fn bounds(value: f64, min: Option<f64>, max: Option<f64>) -> Option<String> {
    outside(value, min, max)
}

pub(super) fn check(value: f64, constraint: &Constraint) -> Check {
    match constraint {
        Constraint::Value(expected) => check_equal(&ConfigValue::Number(value), expected),
        Constraint::Range { min, max } => outside(value, *min, *max).map_or(Check::Pass, Check::Fail),
        Constraint::Values { .. } => Check::Inapplicable,
    }
}

fn outside(value: f64, min: Option<f64>, max: Option<f64>) -> Option<String> {
    if !value.is_finite() {
        return Some(format!("value ({value}) is not a finite number"));
    }
    let shown = format_number(value);
    if let Some(lo) = min.filter(|lo| value < *lo) {
        return Some(format!("value ({shown}) too low ({})", format_number(lo)));
    }
    if let Some(hi) = max.filter(|hi| value > *hi) {
        return Some(format!("value ({shown}) too high ({})", format_number(hi)));
    }
    None
}
