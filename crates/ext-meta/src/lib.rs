//! Extension data model for Extension Manager.
//!
//! This crate provides the immutable extension records, option and demand
//! declarations, version ranges, manifest parsing, and the validated
//! catalogue of installed extensions.

pub mod catalogue;
pub mod demand;
pub mod error;
pub mod extension;
pub mod host;
pub mod manifest;
pub mod option;
pub mod value;
pub mod version;

/// The canonical filename for extension manifest files.
///
/// Every extension directory must contain a file with this name to be
/// picked up by [`Catalogue::load_dir`].
pub const MANIFEST_FILENAME: &str = "extension.toml";

pub use catalogue::Catalogue;
pub use demand::{ConfigDemand, Constraint, DemandEntry, Qualifier, SetMatching};
pub use error::{Error, Result};
pub use extension::{DependencyConstraint, Extension, ExtensionId, ExtensionKind};
pub use host::HostComponent;
pub use manifest::{ExtensionManifest, load_dir, load_extension};
pub use option::{OptionKind, OptionSpec};
pub use value::ConfigValue;
pub use version::{VersionRange, compare, highest_satisfying, parse_version, satisfies};

pub use semver::Version;
