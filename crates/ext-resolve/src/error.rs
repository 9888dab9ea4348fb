use ext_meta::ExtensionId;

/// Errors produced while resolving, activating or upgrading extensions.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No installed version of `target` satisfies the range `extension` declares.
    #[error("'{extension}' requires {target} {range}, which is not installed")]
    UnresolvedDependency {
        extension: ExtensionId,
        target: String,
        range: String,
    },

    /// One or more dependency cycles. Each inner list names every extension
    /// on one cycle.
    #[error("cyclic dependency: {}", format_cycles(.cycles))]
    CyclicDependency { cycles: Vec<Vec<ExtensionId>> },

    /// The version already selected for `target` falls outside a range
    /// another member declares.
    #[error("'{required_by}' requires {target} {range}, but {selected} is selected")]
    VersionConflict {
        target: String,
        selected: ExtensionId,
        required_by: ExtensionId,
        range: String,
    },

    /// The extension is not in the installed catalogue.
    #[error("unknown extension '{0}'")]
    UnknownExtension(String),

    /// The extension is not active.
    #[error("extension '{0}' is not active")]
    NotActive(ExtensionId),

    /// Other active extensions still depend on the extension.
    #[error("extension '{extension}' is still required by {}", join_ids(.required_by))]
    StillRequired {
        extension: ExtensionId,
        required_by: Vec<ExtensionId>,
    },

    /// An upgrade batch could not be applied as a whole.
    #[error("upgrade rejected: {0}")]
    UpgradeRejected(String),

    #[error(transparent)]
    Meta(#[from] ext_meta::Error),
}

fn join_ids(ids: &[ExtensionId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn format_cycles(cycles: &[Vec<ExtensionId>]) -> String {
    cycles
        .iter()
        .map(|cycle| join_ids(cycle))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ResolveError>;
