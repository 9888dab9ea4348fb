//! The immutable extension record and its identity.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::demand::ConfigDemand;
use crate::error::{Error, Result};
use crate::host::HostComponent;
use crate::option::OptionSpec;
use crate::version::{VersionRange, parse_version};

static STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_-]+)\s*(.*)$").unwrap());

/// Identity of one extension version, displayed as `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtensionId {
    pub name: String,
    pub version: Version,
}

impl ExtensionId {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for ExtensionId {
    type Err = Error;

    /// Parse `name@version`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = s.split_once('@').ok_or_else(|| Error::InvalidName {
            name: s.to_string(),
            reason: "expected 'name@version'".to_string(),
        })?;
        validate_name(name)?;
        Ok(Self::new(name, parse_version(version)?))
    }
}

/// Whether an extension is a game module or a script plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    #[default]
    Module,
    Plugin,
}

/// A dependency on another extension by name and version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyConstraint {
    pub target: String,
    pub range: VersionRange,
}

impl DependencyConstraint {
    pub fn new(target: impl Into<String>, range: VersionRange) -> Self {
        Self {
            target: target.into(),
            range,
        }
    }

    /// Parse a dependency statement such as `core >= 1.0.0`, `core ^1` or a
    /// bare `core` (any version).
    pub fn parse_statement(owner: &str, statement: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidDependency {
            extension: owner.to_string(),
            statement: statement.to_string(),
            reason,
        };

        let caps = STATEMENT
            .captures(statement.trim())
            .ok_or_else(|| invalid("expected an extension name".to_string()))?;
        let target = &caps[1];
        let range = VersionRange::parse(&caps[2]).map_err(|e| invalid(e.to_string()))?;

        Ok(Self::new(target, range))
    }

    /// Whether `ext` is a version of the target inside the range.
    pub fn accepts(&self, ext: &Extension) -> bool {
        ext.name == self.target && self.range.matches(&ext.version)
    }
}

impl fmt::Display for DependencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target, self.range)
    }
}

/// An installed extension: identity, dependencies, the options it defines and
/// the demands it places on options when active.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub name: String,
    pub version: Version,
    pub kind: ExtensionKind,
    pub description: Option<String>,
    pub dependencies: Vec<DependencyConstraint>,
    /// Ranges on host components, checked but never planned.
    pub host: BTreeMap<HostComponent, VersionRange>,
    pub options: Vec<OptionSpec>,
    pub demands: Vec<ConfigDemand>,
}

impl Extension {
    /// A bare extension with no dependencies, options or demands.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            kind: ExtensionKind::default(),
            description: None,
            dependencies: Vec::new(),
            host: BTreeMap::new(),
            options: Vec::new(),
            demands: Vec::new(),
        }
    }

    pub fn id(&self) -> ExtensionId {
        ExtensionId::new(self.name.clone(), self.version.clone())
    }

    pub fn is(&self, id: &ExtensionId) -> bool {
        self.name == id.name && self.version == id.version
    }

    /// The option this extension defines under `url`, if any.
    pub fn option(&self, url: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.url == url)
    }

    /// The demands this extension places on `url`, in declaration order.
    pub fn demands_for<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a ConfigDemand> + 'a {
        self.demands.iter().filter(move |d| d.url == url)
    }

    pub fn host_range(&self, component: HostComponent) -> Option<&VersionRange> {
        self.host.get(&component)
    }

    /// Every constraint this extension declares on `name`.
    pub fn dependencies_on<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DependencyConstraint> + 'a {
        self.dependencies.iter().filter(move |d| d.target == name)
    }
}

impl AsRef<Extension> for Extension {
    fn as_ref(&self) -> &Extension {
        self
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Validate an extension name: non-empty, alphanumerics, `-` and `_` only.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "extension name must not be empty".to_string(),
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "extension name must contain only alphanumeric characters, hyphens, or underscores".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement_operator() {
        let c = DependencyConstraint::parse_statement("owner", "core >= 1.0.0").unwrap();
        assert_eq!(c.target, "core");
        assert!(c.range.matches(&Version::new(1, 3, 0)));
        assert!(!c.range.matches(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_parse_statement_exact() {
        let c = DependencyConstraint::parse_statement("owner", "core==1.2.0").unwrap();
        assert!(c.range.matches(&Version::new(1, 2, 0)));
        assert!(!c.range.matches(&Version::new(1, 2, 1)));
    }

    #[test]
    fn test_parse_statement_bare_name() {
        let c = DependencyConstraint::parse_statement("owner", "maps").unwrap();
        assert_eq!(c.target, "maps");
        assert!(c.range.is_any());
    }

    #[test]
    fn test_parse_statement_rejects_garbage() {
        let err = DependencyConstraint::parse_statement("owner", ">= 1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidDependency { .. }));
        let err = DependencyConstraint::parse_statement("owner", "core >= banana").unwrap_err();
        assert!(matches!(err, Error::InvalidDependency { .. }));
    }

    #[test]
    fn test_accepts_checks_name_and_range() {
        let c = DependencyConstraint::parse_statement("owner", "core ^1").unwrap();
        assert!(c.accepts(&Extension::new("core", Version::new(1, 1, 0))));
        assert!(!c.accepts(&Extension::new("core", Version::new(2, 0, 0))));
        assert!(!c.accepts(&Extension::new("other", Version::new(1, 0, 0))));
    }

    #[test]
    fn test_dependencies_on_yields_every_constraint() {
        let mut ext = Extension::new("owner", Version::new(1, 0, 0));
        ext.dependencies = vec![
            DependencyConstraint::parse_statement("owner", "core >= 1.0.0").unwrap(),
            DependencyConstraint::parse_statement("owner", "maps").unwrap(),
            DependencyConstraint::parse_statement("owner", "core < 1.5.0").unwrap(),
        ];
        let ranges: Vec<_> = ext.dependencies_on("core").map(|d| d.range.to_string()).collect();
        assert_eq!(ranges, vec![">= 1.0.0", "< 1.5.0"]);
    }

    #[test]
    fn test_extension_id_round_trip() {
        let id: ExtensionId = "graphics@1.2.0".parse().unwrap();
        assert_eq!(id.name, "graphics");
        assert_eq!(id.to_string(), "graphics@1.2.0");
        assert!("graphics".parse::<ExtensionId>().is_err());
        assert!("graphics@one".parse::<ExtensionId>().is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("ucp-core_2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("bad name").is_err());
    }
}
