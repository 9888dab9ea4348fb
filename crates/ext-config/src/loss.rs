//! Which user-set values survive a transition.
//!
//! A transition (activate, deactivate, rescan, upgrade) produces a candidate
//! state. Each user-set value is checked against that state before it is
//! committed: values for urls no active extension defines any more, and
//! values the new demands block, are lost. Nothing here mutates; a
//! [`TransitionPreview`] can be shown and then thrown away.

use std::fmt;
use std::sync::Arc;

use ext_meta::ConfigValue;
use ext_resolve::ExtensionsState;
use serde::Serialize;

use crate::derived::{DerivedConfiguration, derive_configuration};
use crate::permission::{active_demands, check_permission};
use crate::user::UserConfiguration;
use crate::verdict::PermissionVerdict;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LossReason {
    /// No active extension defines the url.
    NoLongerDefined,
    /// The value got a blocking verdict.
    Rejected(PermissionVerdict),
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLongerDefined => f.write_str("option is no longer defined"),
            Self::Rejected(verdict) => write!(f, "{verdict}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetainedEntry {
    pub url: String,
    pub value: ConfigValue,
    /// `Ok` or `Warning`.
    pub verdict: PermissionVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LostEntry {
    pub url: String,
    pub value: ConfigValue,
    pub reason: LossReason,
}

/// Retained and lost user values, each sorted by url.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigLoss {
    pub retained: Vec<RetainedEntry>,
    pub lost: Vec<LostEntry>,
}

impl ConfigLoss {
    pub fn is_lossless(&self) -> bool {
        self.lost.is_empty()
    }

    /// The user configuration to commit along with the new state.
    pub fn retained_configuration(&self) -> UserConfiguration {
        self.retained
            .iter()
            .map(|entry| (entry.url.clone(), entry.value.clone()))
            .collect()
    }
}

/// Classify every value in `user` against `next`.
pub fn analyze_config_loss(user: &UserConfiguration, next: &ExtensionsState) -> ConfigLoss {
    let mut loss = ConfigLoss::default();

    // `user` iterates in url order, so both lists come out sorted.
    for (url, value) in user.iter() {
        let Some(spec) = next.option(url) else {
            loss.lost.push(LostEntry {
                url: url.to_string(),
                value: value.clone(),
                reason: LossReason::NoLongerDefined,
            });
            continue;
        };

        let verdict = check_permission(value, spec, &active_demands(next, url));
        if verdict.is_blocking() {
            loss.lost.push(LostEntry {
                url: url.to_string(),
                value: value.clone(),
                reason: LossReason::Rejected(verdict),
            });
        } else {
            loss.retained.push(RetainedEntry {
                url: url.to_string(),
                value: value.clone(),
                verdict,
            });
        }
    }

    for entry in &loss.lost {
        tracing::warn!(url = %entry.url, value = %entry.value, reason = %entry.reason, "User value would be lost");
    }
    loss
}

/// A candidate state with everything needed to decide whether to commit it.
#[derive(Debug, Clone)]
pub struct TransitionPreview {
    pub state: Arc<ExtensionsState>,
    pub derived: DerivedConfiguration,
    pub loss: ConfigLoss,
}

impl TransitionPreview {
    pub fn new(state: Arc<ExtensionsState>, user: &UserConfiguration) -> Self {
        let derived = derive_configuration(state.active());
        let loss = analyze_config_loss(user, &state);
        Self { state, derived, loss }
    }

    /// The state and user configuration to store if the preview is accepted.
    pub fn commit(self) -> (Arc<ExtensionsState>, UserConfiguration) {
        let user = self.loss.retained_configuration();
        tracing::info!(
            active = self.state.active().len(),
            retained = self.loss.retained.len(),
            lost = self.loss.lost.len(),
            "Committed transition"
        );
        (self.state, user)
    }
}
