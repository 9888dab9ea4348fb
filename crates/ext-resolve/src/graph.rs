//! Dependency graph between extension versions.
//!
//! Every dependency constraint is resolved to the highest version of its
//! target among the extensions the graph is built from. Edges run from the
//! dependency to the dependent, the "must activate before" direction, so a
//! topological walk of the graph is an activation order.
//!
//! Constraints that do not resolve are not dropped: they are kept as
//! [`UnresolvedConstraint`]s for every consumer to surface.
//!
//! # Example
//!
//! ```
//! use ext_resolve::graph::DependencyGraph;
//! use ext_test_utils::{ExtensionBuilder, ext, id};
//!
//! let exts = vec![
//!     ext("a", "1.0.0"),
//!     ExtensionBuilder::new("b", "1.0.0").depends_on("a ^1.0.0").build(),
//! ];
//! let graph = DependencyGraph::build(&exts);
//!
//! assert_eq!(graph.edge_count(), 1);
//! assert_eq!(graph.dependents_of(&id("a@1.0.0")), vec![&id("b@1.0.0")]);
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use ext_meta::{Extension, ExtensionId, VersionRange, highest_satisfying};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// Why a constraint did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedKind {
    /// No extension of the target name is present.
    Missing,
    /// The target is present, but no version of it lies in the range.
    NoMatchingVersion,
}

/// A dependency constraint that did not resolve to any extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedConstraint {
    pub dependent: ExtensionId,
    pub target: String,
    pub range: VersionRange,
    pub kind: UnresolvedKind,
}

impl fmt::Display for UnresolvedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UnresolvedKind::Missing => write!(
                f,
                "missing dependency {} {} (required by {})",
                self.target, self.range, self.dependent
            ),
            UnresolvedKind::NoMatchingVersion => write!(
                f,
                "no version of {} matches {} (required by {})",
                self.target, self.range, self.dependent
            ),
        }
    }
}

/// Directed graph of resolved dependencies between extension versions.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ExtensionId, ()>,
    nodes: HashMap<ExtensionId, NodeIndex>,
    unresolved: Vec<UnresolvedConstraint>,
}

impl DependencyGraph {
    /// Build the graph for `extensions`.
    ///
    /// Constraints resolve only against the given extensions, so building
    /// from a working set never pulls in anything outside it.
    pub fn build<T: AsRef<Extension>>(extensions: &[T]) -> Self {
        let mut graph = Self::default();

        for ext in extensions {
            graph.add_node(ext.as_ref().id());
        }

        for ext in extensions {
            let ext = ext.as_ref();
            let dependent = ext.id();
            for constraint in &ext.dependencies {
                let same_name = extensions
                    .iter()
                    .filter(|c| c.as_ref().name == constraint.target);
                match highest_satisfying(same_name, &constraint.range) {
                    Some(dependency) => {
                        let dependency = dependency.as_ref().id();
                        tracing::debug!(
                            dependent = %dependent,
                            dependency = %dependency,
                            range = %constraint.range,
                            "Resolved dependency"
                        );
                        graph.add_edge(&dependency, &dependent);
                    }
                    None => {
                        let kind = if extensions.iter().any(|c| c.as_ref().name == constraint.target) {
                            UnresolvedKind::NoMatchingVersion
                        } else {
                            UnresolvedKind::Missing
                        };
                        let unresolved = UnresolvedConstraint {
                            dependent: dependent.clone(),
                            target: constraint.target.clone(),
                            range: constraint.range.clone(),
                            kind,
                        };
                        tracing::warn!("{unresolved}");
                        graph.unresolved.push(unresolved);
                    }
                }
            }
        }

        graph
    }

    fn add_node(&mut self, id: ExtensionId) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.nodes.insert(id, idx);
        idx
    }

    fn add_edge(&mut self, dependency: &ExtensionId, dependent: &ExtensionId) {
        let (Some(&from), Some(&to)) = (self.nodes.get(dependency), self.nodes.get(dependent)) else {
            return;
        };
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &ExtensionId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All node ids, sorted.
    pub fn ids(&self) -> Vec<&ExtensionId> {
        let mut ids: Vec<_> = self.nodes.keys().collect();
        ids.sort();
        ids
    }

    /// Direct dependencies of `id`, sorted.
    pub fn dependencies_of(&self, id: &ExtensionId) -> Vec<&ExtensionId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct dependents of `id`, sorted.
    pub fn dependents_of(&self, id: &ExtensionId) -> Vec<&ExtensionId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Everything that depends on `id` directly or indirectly.
    pub fn transitive_dependents(&self, id: &ExtensionId) -> BTreeSet<ExtensionId> {
        let mut found = BTreeSet::new();
        let Some(&start) = self.nodes.get(id) else {
            return found;
        };

        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if found.insert(self.graph[next].clone()) {
                    queue.push_back(next);
                }
            }
        }
        found
    }

    /// Constraints that did not resolve, in declaration order.
    pub fn unresolved(&self) -> &[UnresolvedConstraint] {
        &self.unresolved
    }

    pub(crate) fn inner(&self) -> &DiGraph<ExtensionId, ()> {
        &self.graph
    }

    fn neighbors(&self, id: &ExtensionId, direction: Direction) -> Vec<&ExtensionId> {
        let Some(&idx) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<_> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| &self.graph[n])
            .collect();
        ids.sort();
        ids
    }
}
