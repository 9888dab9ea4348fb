//! Value permission engine.
//!
//! A candidate value is checked against the option's own declaration first,
//! then against every active demand on its url. Required demands are all
//! checked before any suggested one, so a violated requirement is reported
//! even when an earlier extension's suggestion also fails. Within a pass the
//! first violation in activation order wins.

mod basic;
mod choice;
mod number;
mod set;

use std::mem::discriminant;

use ext_meta::{ConfigDemand, ConfigValue, Constraint, OptionKind, OptionSpec, Qualifier};
use ext_resolve::ExtensionsState;

use crate::error::{Error, Result};
use crate::verdict::{PermissionVerdict, SPEC_AUTHORITY};

/// A demand together with the name of the active extension declaring it.
#[derive(Debug, Clone, Copy)]
pub struct ActiveDemand<'a> {
    pub extension: &'a str,
    pub demand: &'a ConfigDemand,
}

/// Outcome of testing a value against one constraint.
pub(crate) enum Check {
    Pass,
    /// The constraint is not met. Holds the reason without attribution.
    Fail(String),
    /// The constraint kind has no meaning for the option's type.
    Inapplicable,
}

/// Demands on `url` from the active extensions of `state`, in activation
/// order.
pub fn active_demands<'a>(state: &'a ExtensionsState, url: &'a str) -> Vec<ActiveDemand<'a>> {
    state
        .demands_for(url)
        .map(|(ext, demand)| ActiveDemand {
            extension: ext.name.as_str(),
            demand,
        })
        .collect()
}

/// Decide whether `value` may be set for the option `spec`.
///
/// `demands` must be in activation order. The result depends only on the
/// arguments.
pub fn check_permission(value: &ConfigValue, spec: &OptionSpec, demands: &[ActiveDemand<'_>]) -> PermissionVerdict {
    if !spec.kind.accepts_type(value) {
        return PermissionVerdict::error(
            format!(
                "value type ({}) does not match option type ({})",
                value.type_name(),
                spec.kind.type_name()
            ),
            SPEC_AUTHORITY,
        );
    }

    if let Some(reason) = hard_bounds(&spec.kind, value) {
        return PermissionVerdict::illegal(reason, SPEC_AUTHORITY);
    }

    for qualifier in [Qualifier::Required, Qualifier::Suggested] {
        for active in demands.iter().filter(|d| d.demand.qualifier == qualifier) {
            if qualifier == Qualifier::Suggested && overridden(active.demand, demands) {
                continue;
            }
            match evaluate(&spec.kind, value, &active.demand.constraint) {
                Check::Pass => {}
                Check::Fail(reason) => {
                    let reason = format!("{reason} {qualifier} by {}", active.extension);
                    return match qualifier {
                        Qualifier::Required => PermissionVerdict::illegal(reason, active.extension),
                        Qualifier::Suggested => PermissionVerdict::warning(reason, active.extension),
                    };
                }
                Check::Inapplicable => {
                    return PermissionVerdict::error(
                        format!(
                            "{qualifier} {} {} does not apply to {} option '{}'",
                            constraint_kind(&active.demand.constraint),
                            active.demand.constraint,
                            spec.kind.type_name(),
                            spec.url
                        ),
                        active.extension,
                    );
                }
            }
        }
    }

    PermissionVerdict::ok()
}

/// Check `value` for `url` against the active extensions of `state`.
///
/// # Errors
///
/// [`Error::UnknownOption`] if no active extension defines `url`.
pub fn check_value(state: &ExtensionsState, url: &str, value: &ConfigValue) -> Result<PermissionVerdict> {
    let spec = state
        .option(url)
        .ok_or_else(|| Error::UnknownOption(url.to_string()))?;
    let verdict = check_permission(value, spec, &active_demands(state, url));
    tracing::debug!(url, %value, status = %verdict.status, "Checked value");
    Ok(verdict)
}

/// Like [`check_value`], but a blocking verdict becomes
/// [`Error::IllegalValue`].
pub fn ensure_permitted(state: &ExtensionsState, url: &str, value: &ConfigValue) -> Result<PermissionVerdict> {
    let verdict = check_value(state, url, value)?;
    if verdict.is_blocking() {
        return Err(Error::IllegalValue {
            url: url.to_string(),
            reason: verdict.reason,
            by: verdict.by,
        });
    }
    Ok(verdict)
}

fn hard_bounds(kind: &OptionKind, value: &ConfigValue) -> Option<String> {
    match (kind, value) {
        (OptionKind::Number { min, max, .. }, ConfigValue::Number(n)) => number::bounds(*n, *min, *max),
        (OptionKind::Choice { choices, .. }, ConfigValue::Text(t)) => choice::bounds(t, choices),
        (OptionKind::Set { choices: Some(choices), .. }, ConfigValue::Set(_)) => set::bounds(value, choices),
        _ => None,
    }
}

fn evaluate(kind: &OptionKind, value: &ConfigValue, constraint: &Constraint) -> Check {
    match (kind, value) {
        (OptionKind::Number { .. }, ConfigValue::Number(n)) => number::check(*n, constraint),
        (OptionKind::Choice { .. }, ConfigValue::Text(t)) => choice::check(t, constraint),
        (OptionKind::Set { .. }, ConfigValue::Set(_)) => set::check(value, constraint),
        _ => basic::check(value, constraint),
    }
}

/// A suggestion is overridden by any requirement of the same constraint kind.
fn overridden(suggestion: &ConfigDemand, demands: &[ActiveDemand<'_>]) -> bool {
    demands.iter().any(|d| {
        d.demand.is_required() && discriminant(&d.demand.constraint) == discriminant(&suggestion.constraint)
    })
}

fn constraint_kind(constraint: &Constraint) -> &'static str {
    match constraint {
        Constraint::Value(_) => "value",
        Constraint::Range { .. } => "range",
        Constraint::Values { .. } => "values",
    }
}

/// Shared "does not match" check for `Value` constraints.
pub(crate) fn check_equal(value: &ConfigValue, expected: &ConfigValue) -> Check {
    if value.type_name() != expected.type_name() {
        Check::Inapplicable
    } else if value == expected {
        Check::Pass
    } else {
        Check::Fail(format!("value ({value}) does not match the value ({expected})"))
    }
}
