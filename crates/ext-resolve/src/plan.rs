//! Expansion of explicitly activated extensions into their dependency
//! closure.
//!
//! Roots are pinned to the exact version requested. Each dependency reuses
//! the version already selected for its name when that version satisfies
//! the range, otherwise takes a preferred version, otherwise the highest
//! satisfying installed version. When a later constraint rules out a
//! version chosen earlier, planning restarts with a version that satisfies
//! every range seen for that name, if one is installed.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use ext_meta::{Catalogue, Extension, ExtensionId, VersionRange, highest_satisfying};

use crate::error::{ResolveError, Result};

/// Select one version per name for `roots` and everything they depend on.
///
/// `preferred` biases dependency selection towards the currently active
/// versions or upgrade targets; an entry is only taken when it satisfies the
/// range in question, and a later entry for the same name replaces an
/// earlier one. The result is sorted by id; ordering is left to the solver.
pub fn plan_closure(
    catalogue: &Catalogue,
    roots: &[ExtensionId],
    preferred: &[ExtensionId],
) -> Result<Vec<Arc<Extension>>> {
    let mut pinned: BTreeMap<String, Arc<Extension>> = BTreeMap::new();
    for root in roots {
        let ext = catalogue
            .get(root)
            .ok_or_else(|| ResolveError::UnknownExtension(root.to_string()))?;
        if let Some(other) = pinned.get(&root.name) {
            if other.version != root.version {
                return Err(ResolveError::VersionConflict {
                    target: root.name.clone(),
                    selected: other.id(),
                    required_by: root.clone(),
                    range: format!("={}", root.version),
                });
            }
        }
        pinned.insert(root.name.clone(), Arc::clone(ext));
    }

    let mut hints: BTreeMap<String, Arc<Extension>> = BTreeMap::new();
    for id in preferred {
        if let Some(ext) = catalogue.get(id) {
            hints.insert(id.name.clone(), Arc::clone(ext));
        }
    }

    // Each retry pins one more name to a version satisfying all ranges seen
    // on it, so the number of useful retries is bounded by the catalogue.
    let mut retries = 0;
    loop {
        match expand(catalogue, &pinned, &hints) {
            Ok(selected) => {
                tracing::debug!(
                    roots = roots.len(),
                    selected = selected.len(),
                    retries,
                    "Planned dependency closure"
                );
                return Ok(selected.into_values().collect());
            }
            Err(Failure::Retry { name, ranges, error }) => {
                if retries >= catalogue.len() {
                    return Err(error);
                }
                retries += 1;

                let fits = catalogue
                    .versions_of(&name)
                    .into_iter()
                    .find(|c| ranges.iter().all(|r| r.matches(&c.version)));
                match fits {
                    Some(ext) if hints.get(&name).is_none_or(|h| h.version != ext.version) => {
                        tracing::debug!(extension = %ext.id(), "Retrying closure with narrower pick");
                        hints.insert(name, Arc::clone(ext));
                    }
                    _ => return Err(error),
                }
            }
            Err(Failure::Fatal(error)) => return Err(error),
        }
    }
}

enum Failure {
    /// A selected, non-pinned version violates a later range.
    Retry {
        name: String,
        ranges: Vec<VersionRange>,
        error: ResolveError,
    },
    Fatal(ResolveError),
}

fn expand(
    catalogue: &Catalogue,
    pinned: &BTreeMap<String, Arc<Extension>>,
    hints: &BTreeMap<String, Arc<Extension>>,
) -> std::result::Result<BTreeMap<String, Arc<Extension>>, Failure> {
    let mut selected = pinned.clone();
    let mut ranges: BTreeMap<String, Vec<VersionRange>> = BTreeMap::new();
    let mut queue: VecDeque<Arc<Extension>> = pinned.values().cloned().collect();

    while let Some(ext) = queue.pop_front() {
        for constraint in &ext.dependencies {
            let name = &constraint.target;
            ranges
                .entry(name.clone())
                .or_default()
                .push(constraint.range.clone());

            if let Some(current) = selected.get(name) {
                if constraint.range.matches(&current.version) {
                    continue;
                }
                let error = ResolveError::VersionConflict {
                    target: name.clone(),
                    selected: current.id(),
                    required_by: ext.id(),
                    range: constraint.range.to_string(),
                };
                if pinned.contains_key(name) {
                    return Err(Failure::Fatal(error));
                }
                return Err(Failure::Retry {
                    name: name.clone(),
                    ranges: ranges.get(name).cloned().unwrap_or_default(),
                    error,
                });
            }

            let hinted = hints
                .get(name)
                .filter(|h| constraint.range.matches(&h.version));
            let chosen = match hinted {
                Some(h) => Arc::clone(h),
                None => {
                    let versions = catalogue.versions_of(name);
                    match highest_satisfying(versions, &constraint.range) {
                        Some(found) => Arc::clone(found),
                        None => {
                            return Err(Failure::Fatal(ResolveError::UnresolvedDependency {
                                extension: ext.id(),
                                target: name.clone(),
                                range: constraint.range.to_string(),
                            }));
                        }
                    }
                }
            };

            tracing::debug!(dependent = %ext.id(), dependency = %chosen.id(), "Selected dependency");
            selected.insert(name.clone(), Arc::clone(&chosen));
            queue.push_back(chosen);
        }
    }

    Ok(selected)
}
