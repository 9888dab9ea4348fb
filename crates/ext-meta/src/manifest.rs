//! Extension manifest parsing for `extension.toml` files.
//!
//! Each installed extension lives in its own directory containing a
//! manifest named [`MANIFEST_FILENAME`](crate::MANIFEST_FILENAME).
//!
//! # Example TOML
//!
//! ```toml
//! [extension]
//! name = "graphics"
//! version = "1.2.0"
//! kind = "module"
//! description = "Rendering settings"
//! dependencies = ["core >= 1.0.0", { name = "maps", version = "^2" }]
//! host = { framework = ">= 3.0.0" }
//!
//! [[options]]
//! url = "graphics.resolution"
//! type = "number"
//! default = 50
//! min = 0
//! max = 100
//!
//! [config."graphics.resolution"]
//! suggested-range = { min = 10, max = 80 }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::MANIFEST_FILENAME;
use crate::demand::DemandEntry;
use crate::error::{Error, Result};
use crate::extension::{DependencyConstraint, Extension, ExtensionKind, validate_name};
use crate::host::HostComponent;
use crate::option::OptionSpec;
use crate::version::{VersionRange, parse_version};

/// Complete extension manifest loaded from `extension.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtensionManifest {
    /// Core extension metadata.
    pub extension: ExtensionSection,
    /// Options this extension defines.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    /// Demands on option urls, keyed by url.
    #[serde(default)]
    pub config: BTreeMap<String, DemandEntry>,
}

/// The `[extension]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionSection {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub kind: ExtensionKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    /// Ranges on the framework and frontend versions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub host: BTreeMap<HostComponent, String>,
}

/// A dependency as written in a manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    /// `"core >= 1.0.0"` or a bare `"core"`.
    Statement(String),
    /// `{ name = "core", version = "^1" }`.
    Table {
        name: String,
        #[serde(default)]
        version: Option<String>,
    },
}

impl ExtensionManifest {
    /// Parse an extension manifest from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse an extension manifest from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| Error::InManifest {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }

    /// Validate the manifest by building the extension it describes.
    fn validate(&self) -> Result<()> {
        self.to_extension().map(drop)
    }

    /// Build the immutable [`Extension`] this manifest describes.
    pub fn to_extension(&self) -> Result<Extension> {
        let section = &self.extension;
        validate_name(&section.name)?;
        let version = parse_version(&section.version)?;

        let dependencies = section
            .dependencies
            .iter()
            .map(|entry| entry.to_constraint(&section.name))
            .collect::<Result<Vec<_>>>()?;

        let host = section
            .host
            .iter()
            .map(|(component, raw)| {
                let range = VersionRange::parse(raw).map_err(|e| Error::InvalidDependency {
                    extension: section.name.clone(),
                    statement: format!("{component} {raw}"),
                    reason: e.to_string(),
                })?;
                Ok((*component, range))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let mut seen = HashSet::new();
        for option in &self.options {
            option.validate()?;
            if !seen.insert(option.url.as_str()) {
                return Err(Error::DuplicateOptionUrl {
                    url: option.url.clone(),
                    first: section.name.clone(),
                    second: section.name.clone(),
                });
            }
        }

        let mut demands = Vec::new();
        for (url, entry) in &self.config {
            if url.trim().is_empty() {
                return Err(Error::InvalidDemand {
                    extension: section.name.clone(),
                    url: url.clone(),
                    reason: "demand url must not be empty".to_string(),
                });
            }
            demands.extend(entry.to_demands(&section.name, url)?);
        }

        Ok(Extension {
            name: section.name.clone(),
            version,
            kind: section.kind,
            description: section.description.clone(),
            dependencies,
            host,
            options: self.options.clone(),
            demands,
        })
    }
}

impl DependencyEntry {
    fn to_constraint(&self, owner: &str) -> Result<DependencyConstraint> {
        match self {
            Self::Statement(statement) => DependencyConstraint::parse_statement(owner, statement),
            Self::Table { name, version } => {
                validate_name(name).map_err(|e| Error::InvalidDependency {
                    extension: owner.to_string(),
                    statement: name.clone(),
                    reason: e.to_string(),
                })?;
                let range = match version {
                    Some(raw) => VersionRange::parse(raw).map_err(|e| Error::InvalidDependency {
                        extension: owner.to_string(),
                        statement: format!("{name} {raw}"),
                        reason: e.to_string(),
                    })?,
                    None => VersionRange::any(),
                };
                Ok(DependencyConstraint::new(name.clone(), range))
            }
        }
    }
}

/// Load the extension described by the manifest at `path`.
pub fn load_extension(path: &Path) -> Result<Extension> {
    let manifest = ExtensionManifest::from_path(path)?;
    manifest.to_extension()
}

/// Load every `<dir>/*/extension.toml` below `dir`.
///
/// Subdirectories without a manifest are skipped. Results are sorted by
/// `(name, version)`; catalogue-level validation is left to
/// [`Catalogue::new`](crate::Catalogue::new).
pub fn load_dir(dir: &Path) -> Result<Vec<Extension>> {
    if !dir.is_dir() {
        return Err(Error::ManifestNotFound(dir.to_path_buf()));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    entries.sort();

    let mut extensions = Vec::new();
    for entry in entries {
        let manifest = entry.join(MANIFEST_FILENAME);
        if !manifest.is_file() {
            tracing::debug!(path = %entry.display(), "Skipping directory without manifest");
            continue;
        }
        let extension = load_extension(&manifest)?;
        tracing::debug!(extension = %extension, path = %manifest.display(), "Loaded extension manifest");
        extensions.push(extension);
    }

    extensions.sort_by(|a, b| a.id().cmp(&b.id()));
    Ok(extensions)
}
