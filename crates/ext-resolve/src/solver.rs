//! Layered topological ordering of a [`DependencyGraph`].
//!
//! Kahn's algorithm, taking every zero in-degree node at once as a layer.
//! Extensions inside a layer do not depend on each other and are sorted by
//! id, so the order is fully deterministic. When nodes remain after the
//! last layer, the strongly connected components of the remainder name the
//! cycles and no order is returned at all.

use std::collections::{BTreeSet, HashMap};

use ext_meta::ExtensionId;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;

use crate::error::{ResolveError, Result};
use crate::graph::{DependencyGraph, UnresolvedConstraint, UnresolvedKind};

/// A layered activation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationOrder {
    /// Groups of mutually independent extensions, dependencies first.
    pub layers: Vec<Vec<ExtensionId>>,
    /// Constraints that did not resolve while building the graph.
    pub unresolved: Vec<UnresolvedConstraint>,
    /// Extensions ordered despite depending, directly or not, on an
    /// unresolved constraint.
    pub degraded: Vec<ExtensionId>,
}

impl ActivationOrder {
    /// Dependencies before dependents.
    pub fn flatten(&self) -> Vec<ExtensionId> {
        self.layers.iter().flatten().cloned().collect()
    }

    /// Constraints whose target name is absent altogether.
    pub fn missing(&self) -> impl Iterator<Item = &UnresolvedConstraint> {
        self.unresolved
            .iter()
            .filter(|u| u.kind == UnresolvedKind::Missing)
    }

    pub fn is_degraded(&self, id: &ExtensionId) -> bool {
        self.degraded.contains(id)
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Compute the activation order of every node in `graph`.
///
/// # Errors
///
/// Returns [`ResolveError::CyclicDependency`] naming every extension on a
/// cycle if the graph is not acyclic.
pub fn solve(graph: &DependencyGraph) -> Result<ActivationOrder> {
    let inner = graph.inner();

    let mut in_degree: HashMap<NodeIndex, usize> = inner
        .node_indices()
        .map(|idx| (idx, inner.edges_directed(idx, Direction::Incoming).count()))
        .collect();

    let mut layers: Vec<Vec<ExtensionId>> = Vec::new();
    while !in_degree.is_empty() {
        let mut layer: Vec<NodeIndex> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(idx, _)| *idx)
            .collect();
        if layer.is_empty() {
            break;
        }
        layer.sort_by(|a, b| inner[*a].cmp(&inner[*b]));

        for idx in &layer {
            in_degree.remove(idx);
            for next in inner.neighbors_directed(*idx, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg = deg.saturating_sub(1);
                }
            }
        }

        tracing::debug!(layer = layers.len(), size = layer.len(), "Solved activation layer");
        layers.push(layer.into_iter().map(|idx| inner[idx].clone()).collect());
    }

    if !in_degree.is_empty() {
        let cycles = find_cycles(graph, &in_degree.keys().copied().collect());
        tracing::warn!(cycles = cycles.len(), "Dependency cycle detected");
        return Err(ResolveError::CyclicDependency { cycles });
    }

    let mut degraded = BTreeSet::new();
    for unresolved in graph.unresolved() {
        degraded.insert(unresolved.dependent.clone());
        degraded.extend(graph.transitive_dependents(&unresolved.dependent));
    }

    Ok(ActivationOrder {
        layers,
        unresolved: graph.unresolved().to_vec(),
        degraded: degraded.into_iter().collect(),
    })
}

/// Strongly connected components of the nodes left over by layering that
/// form cycles: more than one member, or a single node depending on itself.
fn find_cycles(graph: &DependencyGraph, remaining: &BTreeSet<NodeIndex>) -> Vec<Vec<ExtensionId>> {
    let inner = graph.inner();
    let rest = inner.filter_map(
        |idx, id| remaining.contains(&idx).then(|| id.clone()),
        |_, edge| Some(*edge),
    );

    let mut cycles: Vec<Vec<ExtensionId>> = tarjan_scc(&rest)
        .into_iter()
        .filter(|scc| scc.len() > 1 || rest.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut ids: Vec<_> = scc.into_iter().map(|idx| rest[idx].clone()).collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}
