//! Derived configuration: the values active extensions ask for.
//!
//! Only `Value` demands take part. They are folded in activation order:
//!
//! - a later suggestion replaces an earlier one;
//! - a requirement replaces a suggestion and locks the url;
//! - a suggestion arriving after a requirement is dropped;
//! - two different requirements conflict and the first one is kept.
//!
//! Every replacement and drop is recorded as an [`Override`]. A demanded
//! value the option itself refuses (wrong type, outside the hard bounds) is
//! skipped and recorded as a [`ConfigConflict`].

use std::collections::BTreeMap;
use std::fmt;

use ext_meta::{ConfigValue, Constraint, Extension, OptionSpec, Qualifier};
use serde::Serialize;

use crate::permission::check_permission;

/// A value and the extension that asked for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced {
    pub value: ConfigValue,
    pub by: String,
}

impl Sourced {
    fn new(value: &ConfigValue, by: &str) -> Self {
        Self {
            value: value.clone(),
            by: by.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideKind {
    /// A later suggestion replaced an earlier one.
    SuggestionReplaced,
    /// A requirement replaced an earlier suggestion.
    SuggestionLocked,
    /// A suggestion came after a requirement and was dropped.
    SuggestionIgnored,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Override {
    pub url: String,
    pub kind: OverrideKind,
    pub kept: Sourced,
    pub dropped: Sourced,
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, qualifier) = match self.kind {
            OverrideKind::SuggestionReplaced => ("overridden by", "suggested"),
            OverrideKind::SuggestionLocked => ("overridden by", "required"),
            OverrideKind::SuggestionIgnored => ("ignored in favour of", "required"),
        };
        write!(
            f,
            "{}: {} suggested by '{}' {verb} {} {qualifier} by '{}'",
            self.url, self.dropped.value, self.dropped.by, self.kept.value, self.kept.by
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConfigConflict {
    /// Two extensions require different values for the same url.
    DifferentRequirements {
        url: String,
        kept: Sourced,
        rejected: Sourced,
    },
    /// A demanded value the option does not accept.
    IllegalDemand {
        url: String,
        rejected: Sourced,
        reason: String,
    },
}

impl fmt::Display for ConfigConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DifferentRequirements { url, kept, rejected } => write!(
                f,
                "'{}' and '{}' require different values for '{url}' ({} and {})",
                kept.by, rejected.by, kept.value, rejected.value
            ),
            Self::IllegalDemand { url, rejected, reason } => write!(
                f,
                "'{}' demands {} for '{url}', which the option refuses: {reason}",
                rejected.by, rejected.value
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    Clean,
    Warnings,
    Errors,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedConfiguration {
    /// Every url defined by an active extension, with its derived value or
    /// its default.
    pub values: BTreeMap<String, ConfigValue>,
    /// Urls whose value comes from a requirement.
    pub locks: BTreeMap<String, Sourced>,
    /// Urls whose value comes from a suggestion.
    pub suggestions: BTreeMap<String, Sourced>,
    pub overrides: Vec<Override>,
    pub conflicts: Vec<ConfigConflict>,
}

impl DerivedConfiguration {
    pub fn status(&self) -> DerivedStatus {
        if !self.conflicts.is_empty() {
            DerivedStatus::Errors
        } else if !self.overrides.is_empty() {
            DerivedStatus::Warnings
        } else {
            DerivedStatus::Clean
        }
    }

    pub fn is_locked(&self, url: &str) -> bool {
        self.locks.contains_key(url)
    }
}

/// Fold the `Value` demands of `active` (in activation order) into a derived
/// configuration.
pub fn derive_configuration<T: AsRef<Extension>>(active: &[T]) -> DerivedConfiguration {
    let mut derived = DerivedConfiguration::default();
    let mut specs: BTreeMap<&str, &OptionSpec> = BTreeMap::new();

    for ext in active.iter().map(AsRef::as_ref) {
        for option in &ext.options {
            derived.values.insert(option.url.clone(), option.default_value());
            specs.insert(option.url.as_str(), option);
        }
    }

    for ext in active.iter().map(AsRef::as_ref) {
        for demand in &ext.demands {
            let Constraint::Value(value) = &demand.constraint else {
                continue;
            };
            let incoming = Sourced::new(value, &ext.name);
            if let Some(spec) = specs.get(demand.url.as_str()) {
                let verdict = check_permission(value, spec, &[]);
                if !verdict.is_ok() {
                    tracing::warn!(
                        url = %demand.url,
                        by = %ext.name,
                        reason = %verdict.reason,
                        "Demanded value refused by option"
                    );
                    derived.conflicts.push(ConfigConflict::IllegalDemand {
                        url: demand.url.clone(),
                        rejected: incoming,
                        reason: verdict.reason,
                    });
                    continue;
                }
            }
            match demand.qualifier {
                Qualifier::Required => derived.require(&demand.url, incoming),
                Qualifier::Suggested => derived.suggest(&demand.url, incoming),
            }
        }
    }

    let chosen: Vec<(String, ConfigValue)> = derived
        .suggestions
        .iter()
        .chain(derived.locks.iter())
        .map(|(url, s)| (url.clone(), s.value.clone()))
        .collect();
    for (url, value) in chosen {
        match derived.values.get_mut(&url) {
            Some(slot) => *slot = value,
            None => tracing::warn!(url = %url, "Demanded value for an option no active extension defines"),
        }
    }

    tracing::debug!(
        values = derived.values.len(),
        locks = derived.locks.len(),
        overrides = derived.overrides.len(),
        conflicts = derived.conflicts.len(),
        "Derived configuration"
    );
    derived
}

impl DerivedConfiguration {
    fn require(&mut self, url: &str, incoming: Sourced) {
        if let Some(existing) = self.locks.get(url) {
            if existing.value != incoming.value {
                tracing::warn!(
                    url,
                    kept = %existing.by,
                    rejected = %incoming.by,
                    "Conflicting required values"
                );
                self.conflicts.push(ConfigConflict::DifferentRequirements {
                    url: url.to_string(),
                    kept: existing.clone(),
                    rejected: incoming,
                });
            }
            return;
        }

        if let Some(dropped) = self.suggestions.remove(url) {
            self.overrides.push(Override {
                url: url.to_string(),
                kind: OverrideKind::SuggestionLocked,
                kept: incoming.clone(),
                dropped,
            });
        }
        self.locks.insert(url.to_string(), incoming);
    }

    fn suggest(&mut self, url: &str, incoming: Sourced) {
        if let Some(lock) = self.locks.get(url) {
            self.overrides.push(Override {
                url: url.to_string(),
                kind: OverrideKind::SuggestionIgnored,
                kept: lock.clone(),
                dropped: incoming,
            });
            return;
        }

        if let Some(dropped) = self.suggestions.insert(url.to_string(), incoming.clone()) {
            self.overrides.push(Override {
                url: url.to_string(),
                kind: OverrideKind::SuggestionReplaced,
                kept: incoming,
                dropped,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ext_test_utils::{ExtensionBuilder, ext};
    use pretty_assertions::assert_eq;

    fn base() -> Extension {
        ExtensionBuilder::new("base", "1.0.0")
            .number_option("base.x", 1.0, None, None)
            .bool_option("base.flag", false)
            .build()
    }

    #[test]
    fn test_defaults_fill_undemanded_urls() {
        let derived = derive_configuration(&[base()]);
        assert_eq!(derived.values.get("base.x"), Some(&ConfigValue::from(1)));
        assert_eq!(derived.values.get("base.flag"), Some(&ConfigValue::from(false)));
        assert_eq!(derived.status(), DerivedStatus::Clean);
    }

    #[test]
    fn test_last_suggestion_wins() {
        let a = ExtensionBuilder::new("a", "1.0.0").suggests_value("base.x", 2).build();
        let b = ExtensionBuilder::new("b", "1.0.0").suggests_value("base.x", 3).build();
        let derived = derive_configuration(&[base(), a, b]);

        assert_eq!(derived.values["base.x"], ConfigValue::from(3));
        assert_eq!(derived.suggestions["base.x"].by, "b");
        assert_eq!(derived.overrides.len(), 1);
        assert_eq!(derived.overrides[0].kind, OverrideKind::SuggestionReplaced);
        assert_eq!(derived.status(), DerivedStatus::Warnings);
    }

    #[test]
    fn test_requirement_locks_over_suggestions() {
        let a = ExtensionBuilder::new("a", "1.0.0").suggests_value("base.x", 2).build();
        let p = ExtensionBuilder::new("p", "1.0.0").requires_value("base.x", 50).build();
        let c = ExtensionBuilder::new("c", "1.0.0").suggests_value("base.x", 9).build();
        let derived = derive_configuration(&[base(), a, p, c]);

        assert_eq!(derived.values["base.x"], ConfigValue::from(50));
        assert!(derived.is_locked("base.x"));
        assert!(derived.suggestions.is_empty());
        let kinds: Vec<_> = derived.overrides.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![OverrideKind::SuggestionLocked, OverrideKind::SuggestionIgnored]);
        assert_eq!(
            derived.overrides[1].to_string(),
            "base.x: 9 suggested by 'c' ignored in favour of 50 required by 'p'"
        );
    }

    #[test]
    fn test_different_requirements_conflict_and_first_is_kept() {
        let p = ExtensionBuilder::new("p", "1.0.0").requires_value("base.x", 50).build();
        let q = ExtensionBuilder::new("q", "1.0.0").requires_value("base.x", 60).build();
        let r = ExtensionBuilder::new("r", "1.0.0").requires_value("base.x", 50).build();
        let derived = derive_configuration(&[base(), p, q, r]);

        assert_eq!(derived.values["base.x"], ConfigValue::from(50));
        assert_eq!(derived.conflicts.len(), 1);
        assert_eq!(
            derived.conflicts[0].to_string(),
            "'p' and 'q' require different values for 'base.x' (50 and 60)"
        );
        assert_eq!(derived.status(), DerivedStatus::Errors);
    }

    #[test]
    fn test_demand_the_option_refuses_is_skipped() {
        let bounded = ExtensionBuilder::new("base", "1.0.0")
            .number_option("base.x", 1.0, Some(0.0), Some(10.0))
            .build();
        let typo = ExtensionBuilder::new("typo", "1.0.0").requires_value("base.x", "abc").build();
        let big = ExtensionBuilder::new("big", "1.0.0").suggests_value("base.x", 99).build();
        let derived = derive_configuration(&[bounded, typo, big]);

        assert_eq!(derived.values["base.x"], ConfigValue::from(1));
        assert!(!derived.is_locked("base.x"));
        assert!(derived.suggestions.is_empty());
        assert_eq!(derived.status(), DerivedStatus::Errors);
        let lines: Vec<_> = derived.conflicts.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "'typo' demands \"abc\" for 'base.x', which the option refuses: value type (string) does not match option type (number)",
                "'big' demands 99 for 'base.x', which the option refuses: value (99) too high (10)",
            ]
        );
    }

    #[test]
    fn test_undefined_url_is_not_in_values() {
        let a = ExtensionBuilder::new("a", "1.0.0").suggests_value("ghost.x", 2).build();
        let derived = derive_configuration(&[ext("plain", "1.0.0"), a]);
        assert!(derived.values.is_empty());
        assert_eq!(derived.suggestions["ghost.x"].by, "a");
    }
}
