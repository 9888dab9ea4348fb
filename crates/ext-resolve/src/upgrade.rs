//! Upgrade selection for the active extension set.
//!
//! Upgrades are all or nothing: either every proposal is applied and the
//! result resolves, or the caller gets its own state back untouched.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ext_resolve::{ExtensionsState, UpgradeOutcome, upgrade};
//! use ext_test_utils::{ExtensionBuilder, catalogue, ext, id};
//!
//! let installed = catalogue(vec![
//!     ext("a", "1.0.0"),
//!     ext("a", "2.0.0"),
//!     ExtensionBuilder::new("b", "1.0.0").depends_on("a ^1.0.0").build(),
//! ]);
//! let state = Arc::new(ExtensionsState::from_explicit(installed, &[id("b@1.0.0")]).unwrap());
//!
//! // b pins a to ^1.0.0, so a@2.0.0 is never proposed.
//! let outcome = upgrade(&state);
//! assert!(matches!(outcome, UpgradeOutcome::Unchanged { .. }));
//! assert!(Arc::ptr_eq(outcome.state(), &state));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ext_meta::{Extension, ExtensionId, compare};

use crate::error::ResolveError;
use crate::state::ExtensionsState;

/// Newer installed versions of one active extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCandidate {
    pub current: ExtensionId,
    /// Strictly newer versions, newest first.
    pub newer: Vec<ExtensionId>,
}

/// One proposed version change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeProposal {
    pub from: ExtensionId,
    pub to: ExtensionId,
}

impl fmt::Display for UpgradeProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to.version)
    }
}

/// The result of [`upgrade`].
#[derive(Debug)]
pub enum UpgradeOutcome {
    /// Every proposal was applied.
    Upgraded {
        state: Arc<ExtensionsState>,
        applied: Vec<UpgradeProposal>,
    },
    /// Nothing to upgrade; `state` is the input state.
    Unchanged { state: Arc<ExtensionsState> },
    /// The batch failed to resolve; `state` is the input state.
    Rejected {
        state: Arc<ExtensionsState>,
        reason: ResolveError,
    },
}

impl UpgradeOutcome {
    /// The state to keep after the upgrade attempt.
    pub fn state(&self) -> &Arc<ExtensionsState> {
        match self {
            Self::Upgraded { state, .. } | Self::Unchanged { state } | Self::Rejected { state, .. } => state,
        }
    }

    pub fn is_upgraded(&self) -> bool {
        matches!(self, Self::Upgraded { .. })
    }
}

/// Every active extension that has strictly newer installed versions, in
/// activation order.
pub fn available_upgrades(state: &ExtensionsState) -> Vec<UpgradeCandidate> {
    state
        .active()
        .iter()
        .filter_map(|ext| {
            let newer: Vec<ExtensionId> = newer_versions(state, ext).iter().map(|e| e.id()).collect();
            (!newer.is_empty()).then(|| UpgradeCandidate {
                current: ext.id(),
                newer,
            })
        })
        .collect()
}

/// Pick the highest newer version of each active extension that the other
/// members of the proposed set accept.
///
/// Starts from the newest version of every name and lowers a pick whenever
/// another member's range on that name excludes it, until no pick changes.
/// Picks never go below the current version; a name whose pick falls back
/// to the current version gets no proposal.
pub fn select_upgrades(state: &ExtensionsState) -> Vec<UpgradeProposal> {
    // name -> versions to try, newest first, ending with the current one
    let mut ladders: BTreeMap<&str, Vec<&Arc<Extension>>> = BTreeMap::new();
    let mut picks: BTreeMap<&str, usize> = BTreeMap::new();
    for ext in state.active() {
        let mut ladder = newer_versions(state, ext);
        ladder.push(ext);
        ladders.insert(ext.name.as_str(), ladder);
        picks.insert(ext.name.as_str(), 0);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (name, ladder) in &ladders {
            let Some(&start) = picks.get(name) else {
                continue;
            };
            let last = ladder.len() - 1;
            let mut pick = start;
            while pick < last && !accepted_by_others(&ladders, &picks, name, ladder[pick]) {
                pick += 1;
            }
            if pick != start {
                tracing::debug!(
                    extension = %name,
                    from = %ladder[start].version,
                    to = %ladder[pick].version,
                    "Lowered upgrade pick"
                );
                picks.insert(*name, pick);
                changed = true;
            }
        }
    }

    state
        .active()
        .iter()
        .filter_map(|ext| {
            let ladder = ladders.get(ext.name.as_str())?;
            let pick = ladder[*picks.get(ext.name.as_str())?];
            (pick.version != ext.version).then(|| UpgradeProposal {
                from: ext.id(),
                to: pick.id(),
            })
        })
        .collect()
}

/// Apply [`select_upgrades`] to `state` as one batch.
///
/// Explicitly activated extensions are replaced by their proposed versions;
/// other proposals are preferred when the closure is planned again. If
/// planning or ordering fails, or any proposal does not end up active, the
/// batch is rejected and the same `Arc` is handed back.
pub fn upgrade(state: &Arc<ExtensionsState>) -> UpgradeOutcome {
    let proposals = select_upgrades(state);
    if proposals.is_empty() {
        tracing::debug!("No upgrades available");
        return UpgradeOutcome::Unchanged {
            state: Arc::clone(state),
        };
    }

    let explicit: Vec<ExtensionId> = state
        .explicitly_activated()
        .iter()
        .map(|id| {
            proposals
                .iter()
                .find(|p| &p.from == id)
                .map_or_else(|| id.clone(), |p| p.to.clone())
        })
        .collect();
    // Later entries win, so proposals override the current versions.
    let preferred: Vec<ExtensionId> = state
        .active_ids()
        .into_iter()
        .chain(proposals.iter().map(|p| p.to.clone()))
        .collect();

    let rejected = |reason: String| {
        tracing::warn!(%reason, "Upgrade rejected");
        UpgradeOutcome::Rejected {
            state: Arc::clone(state),
            reason: ResolveError::UpgradeRejected(reason),
        }
    };

    let next = match ExtensionsState::resolve(state.installed().clone(), explicit, &preferred) {
        Ok(next) => next,
        Err(e) => return rejected(e.to_string()),
    };

    if let Some(skipped) = proposals.iter().find(|p| !next.is_active(&p.to)) {
        return rejected(format!("{skipped} could not be applied"));
    }

    tracing::info!(count = proposals.len(), "Upgraded extensions");
    UpgradeOutcome::Upgraded {
        state: Arc::new(next),
        applied: proposals,
    }
}

fn newer_versions<'a>(state: &'a ExtensionsState, ext: &Extension) -> Vec<&'a Arc<Extension>> {
    state
        .installed()
        .versions_of(&ext.name)
        .into_iter()
        .filter(|candidate| compare(&candidate.version, &ext.version) == Ordering::Greater)
        .collect()
}

/// Whether every constraint of every other member, at its current pick,
/// accepts `candidate`.
fn accepted_by_others(
    ladders: &BTreeMap<&str, Vec<&Arc<Extension>>>,
    picks: &BTreeMap<&str, usize>,
    name: &str,
    candidate: &Extension,
) -> bool {
    ladders.iter().filter(|(other, _)| **other != name).all(|(other, ladder)| {
        let member = picks.get(other).map_or(ladder[ladder.len() - 1], |&i| ladder[i]);
        member.dependencies_on(name).all(|c| c.accepts(candidate))
    })
}
