//! Dependency resolution for Extension Manager.
//!
//! This crate turns a catalogue of installed extensions into a dependency
//! graph, orders it into activation layers, plans the closure of the
//! explicitly activated set, selects upgrades, and checks the host ranges
//! active extensions declare. Every operation is pure: transitions return a
//! new [`ExtensionsState`] or an error value.

pub mod error;
pub mod graph;
pub mod host;
pub mod plan;
pub mod solver;
pub mod state;
pub mod upgrade;

pub use error::{ResolveError, Result};
pub use graph::{DependencyGraph, UnresolvedConstraint, UnresolvedKind};
pub use host::{HostCheck, HostCheckState, HostVersions, check_active_host, check_host};
pub use plan::plan_closure;
pub use solver::{ActivationOrder, solve};
pub use state::ExtensionsState;
pub use upgrade::{
    UpgradeCandidate, UpgradeOutcome, UpgradeProposal, available_upgrades, select_upgrades, upgrade,
};
