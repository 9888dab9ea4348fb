//! The resolved extension state and its transitions.
//!
//! An [`ExtensionsState`] is never mutated. Every transition (activate,
//! deactivate, rescan, upgrade) plans the dependency closure of the explicit
//! set again, orders it, and returns a new value. Callers keep the current
//! state behind an `Arc` and swap it in one assignment.

use std::sync::Arc;

use ext_meta::{Catalogue, ConfigDemand, Extension, ExtensionId, OptionSpec};

use crate::error::{ResolveError, Result};
use crate::graph::DependencyGraph;
use crate::plan::plan_closure;
use crate::solver::solve;

/// Installed extensions plus the active, ordered working set.
///
/// `active` is the dependency closure of `explicitly_activated`, holds at
/// most one version per name, and lists dependencies before dependents.
#[derive(Debug, Clone)]
pub struct ExtensionsState {
    installed: Catalogue,
    active: Vec<Arc<Extension>>,
    explicitly_activated: Vec<ExtensionId>,
    layers: Vec<Vec<ExtensionId>>,
    dependency_tree: DependencyGraph,
}

impl ExtensionsState {
    /// A state with nothing active.
    pub fn new(installed: Catalogue) -> Self {
        Self {
            installed,
            active: Vec::new(),
            explicitly_activated: Vec::new(),
            layers: Vec::new(),
            dependency_tree: DependencyGraph::default(),
        }
    }

    /// Resolve a persisted list of explicitly activated extensions.
    pub fn from_explicit(installed: Catalogue, explicit: &[ExtensionId]) -> Result<Self> {
        Self::resolve(installed, explicit.to_vec(), &[])
    }

    /// Plan, build and order the closure of `explicit`, preferring the
    /// versions in `preferred` for dependencies.
    pub(crate) fn resolve(
        installed: Catalogue,
        mut explicit: Vec<ExtensionId>,
        preferred: &[ExtensionId],
    ) -> Result<Self> {
        explicit.sort();
        explicit.dedup();

        let closure = plan_closure(&installed, &explicit, preferred)?;
        let dependency_tree = DependencyGraph::build(&closure);
        if let Some(unresolved) = dependency_tree.unresolved().first() {
            return Err(ResolveError::UnresolvedDependency {
                extension: unresolved.dependent.clone(),
                target: unresolved.target.clone(),
                range: unresolved.range.to_string(),
            });
        }
        let order = solve(&dependency_tree)?;

        let active = order
            .flatten()
            .iter()
            .filter_map(|id| closure.iter().find(|e| e.is(id)).cloned())
            .collect();

        Ok(Self {
            installed,
            active,
            explicitly_activated: explicit,
            layers: order.layers,
            dependency_tree,
        })
    }

    /// Activate `id`, replacing any other explicitly activated version of the
    /// same name.
    pub fn activate(&self, id: &ExtensionId) -> Result<Self> {
        if !self.installed.contains(id) {
            return Err(ResolveError::UnknownExtension(id.to_string()));
        }

        let mut explicit: Vec<_> = self
            .explicitly_activated
            .iter()
            .filter(|e| e.name != id.name)
            .cloned()
            .collect();
        explicit.push(id.clone());

        let next = Self::resolve(self.installed.clone(), explicit, &self.active_ids())?;
        tracing::info!(extension = %id, active = next.active.len(), "Activated extension");
        Ok(next)
    }

    /// Deactivate `id`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NotActive`] if `id` is not active, and
    /// [`ResolveError::StillRequired`] if other active extensions depend on
    /// it.
    pub fn deactivate(&self, id: &ExtensionId) -> Result<Self> {
        if !self.is_active(id) {
            return Err(ResolveError::NotActive(id.clone()));
        }

        let required_by: Vec<ExtensionId> = self.dependents_of(id).into_iter().cloned().collect();
        if !required_by.is_empty() {
            return Err(ResolveError::StillRequired {
                extension: id.clone(),
                required_by,
            });
        }

        let explicit = self
            .explicitly_activated
            .iter()
            .filter(|e| *e != id)
            .cloned()
            .collect();

        let next = Self::resolve(self.installed.clone(), explicit, &self.active_ids())?;
        tracing::info!(extension = %id, active = next.active.len(), "Deactivated extension");
        Ok(next)
    }

    /// Rebuild against a rescanned catalogue, keeping the explicitly
    /// activated extensions that are still installed.
    ///
    /// Dependencies keep their current versions where those still fit;
    /// moving to newer versions is left to upgrades.
    pub fn with_installed(&self, installed: Catalogue) -> Result<Self> {
        let (kept, dropped): (Vec<_>, Vec<_>) = self
            .explicitly_activated
            .iter()
            .cloned()
            .partition(|id| installed.contains(id));
        for id in &dropped {
            tracing::warn!(extension = %id, "Activated extension is no longer installed");
        }
        let current = self.active_ids();
        Self::resolve(installed, kept, &current)
    }

    pub fn installed(&self) -> &Catalogue {
        &self.installed
    }

    /// Active extensions in activation order.
    pub fn active(&self) -> &[Arc<Extension>] {
        &self.active
    }

    /// Explicitly activated extensions, sorted.
    pub fn explicitly_activated(&self) -> &[ExtensionId] {
        &self.explicitly_activated
    }

    pub fn layers(&self) -> &[Vec<ExtensionId>] {
        &self.layers
    }

    pub fn dependency_tree(&self) -> &DependencyGraph {
        &self.dependency_tree
    }

    pub fn is_active(&self, id: &ExtensionId) -> bool {
        self.active.iter().any(|e| e.is(id))
    }

    pub fn is_explicit(&self, id: &ExtensionId) -> bool {
        self.explicitly_activated.contains(id)
    }

    /// Active ids in activation order.
    pub fn active_ids(&self) -> Vec<ExtensionId> {
        self.active.iter().map(|e| e.id()).collect()
    }

    pub fn active_version_of(&self, name: &str) -> Option<&Arc<Extension>> {
        self.active.iter().find(|e| e.name == name)
    }

    /// Active extensions that directly depend on `id`.
    pub fn dependents_of(&self, id: &ExtensionId) -> Vec<&ExtensionId> {
        self.dependency_tree.dependents_of(id)
    }

    /// Options defined by active extensions, in activation order.
    pub fn option_specs(&self) -> impl Iterator<Item = (&Extension, &OptionSpec)> {
        self.active
            .iter()
            .flat_map(|e| e.options.iter().map(move |o| (&**e, o)))
    }

    /// The option an active extension defines under `url`.
    pub fn option(&self, url: &str) -> Option<&OptionSpec> {
        self.active.iter().find_map(|e| e.option(url))
    }

    /// Demands on `url` from active extensions, in activation order.
    pub fn demands_for<'a>(&'a self, url: &'a str) -> impl Iterator<Item = (&'a Extension, &'a ConfigDemand)> + 'a {
        self.active
            .iter()
            .flat_map(move |e| e.demands_for(url).map(move |d| (&**e, d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ext_test_utils::{ExtensionBuilder, catalogue, ext, id};
    use pretty_assertions::assert_eq;

    fn names(state: &ExtensionsState) -> Vec<String> {
        state.active_ids().iter().map(ToString::to_string).collect()
    }

    fn fixture() -> Catalogue {
        catalogue(vec![
            ext("core", "1.0.0"),
            ext("core", "1.1.0"),
            ExtensionBuilder::new("maps", "1.0.0").depends_on("core ^1").build(),
            ExtensionBuilder::new("ui", "2.0.0")
                .depends_on("maps")
                .depends_on("core >= 1.0.0")
                .build(),
            ext("extra", "0.1.0"),
        ])
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = ExtensionsState::new(fixture());
        assert!(state.active().is_empty());
        assert!(state.layers().is_empty());
        assert_eq!(state.installed().len(), 5);
    }

    #[test]
    fn test_activate_pulls_in_dependencies_in_order() {
        let state = ExtensionsState::new(fixture()).activate(&id("ui@2.0.0")).unwrap();
        assert_eq!(names(&state), vec!["core@1.1.0", "maps@1.0.0", "ui@2.0.0"]);
        assert_eq!(state.explicitly_activated(), &[id("ui@2.0.0")]);
        assert_eq!(state.layers().len(), 3);
        assert!(state.is_active(&id("core@1.1.0")));
        assert!(!state.is_explicit(&id("core@1.1.0")));
    }

    #[test]
    fn test_activate_replaces_other_version() {
        let state = ExtensionsState::new(fixture())
            .activate(&id("core@1.0.0"))
            .unwrap()
            .activate(&id("core@1.1.0"))
            .unwrap();
        assert_eq!(names(&state), vec!["core@1.1.0"]);
    }

    #[test]
    fn test_activate_unknown() {
        let err = ExtensionsState::new(fixture()).activate(&id("ghost@1.0.0")).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownExtension(_)));
    }

    #[test]
    fn test_deactivate_dependency_still_required() {
        let state = ExtensionsState::new(fixture()).activate(&id("ui@2.0.0")).unwrap();
        let err = state.deactivate(&id("maps@1.0.0")).unwrap_err();
        match err {
            ResolveError::StillRequired { extension, required_by } => {
                assert_eq!(extension, id("maps@1.0.0"));
                assert_eq!(required_by, vec![id("ui@2.0.0")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deactivate_drops_orphaned_dependencies() {
        let state = ExtensionsState::new(fixture())
            .activate(&id("ui@2.0.0"))
            .unwrap()
            .activate(&id("extra@0.1.0"))
            .unwrap();
        let next = state.deactivate(&id("ui@2.0.0")).unwrap();
        assert_eq!(names(&next), vec!["extra@0.1.0"]);
        assert_eq!(names(&state).len(), 4);
    }

    #[test]
    fn test_deactivate_inactive() {
        let err = ExtensionsState::new(fixture()).deactivate(&id("extra@0.1.0")).unwrap_err();
        assert!(matches!(err, ResolveError::NotActive(_)));
    }

    #[test]
    fn test_with_installed_keeps_surviving_explicit() {
        let state = ExtensionsState::new(fixture())
            .activate(&id("maps@1.0.0"))
            .unwrap()
            .activate(&id("extra@0.1.0"))
            .unwrap();
        let rescanned = catalogue(vec![
            ext("core", "1.0.0"),
            ExtensionBuilder::new("maps", "1.0.0").depends_on("core ^1").build(),
        ]);
        let next = state.with_installed(rescanned).unwrap();
        assert_eq!(names(&next), vec!["core@1.0.0", "maps@1.0.0"]);
    }

    #[test]
    fn test_demands_in_activation_order() {
        let cat = catalogue(vec![
            ExtensionBuilder::new("base", "1.0.0")
                .number_option("base.x", 0.0, None, None)
                .suggests_value("base.x", 1)
                .build(),
            ExtensionBuilder::new("top", "1.0.0")
                .depends_on("base")
                .requires_value("base.x", 2)
                .build(),
        ]);
        let state = ExtensionsState::from_explicit(cat, &[id("top@1.0.0")]).unwrap();
        let by: Vec<_> = state.demands_for("base.x").map(|(e, _)| e.name.as_str()).collect();
        assert_eq!(by, vec!["base", "top"]);
        assert!(state.option("base.x").is_some());
        assert_eq!(state.option_specs().count(), 1);
    }
}
