//! Version parsing and range matching.
//!
//! Extension versions are semver. Dependency ranges use the semver
//! requirement syntax with two conveniences carried over from extension
//! manifests written by hand:
//!
//! - `==` is accepted as an alias for `=`
//! - whitespace between an operator and its version is ignored (`>= 1.0.0`)
//!
//! An empty range or `*` matches every version, including pre-releases of
//! nothing in particular (see [`VersionRange::any`]).
//!
//! # Examples
//!
//! ```
//! use ext_meta::version::{VersionRange, parse_version, satisfies};
//!
//! let range = VersionRange::parse(">= 1.2, <2").unwrap();
//! assert!(satisfies(&parse_version("1.4.0").unwrap(), &range));
//! assert!(!satisfies(&parse_version("2.0.0").unwrap(), &range));
//!
//! let caret = VersionRange::parse("^1.0.0").unwrap();
//! assert!(!caret.matches(&parse_version("2.0.0").unwrap()));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::{Version, VersionReq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::extension::Extension;

static OPERATOR_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(==|>=|<=|[<>=~^])\s+").unwrap());

/// A parsed version range that can be checked against concrete versions.
#[derive(Clone, PartialEq, Eq)]
pub struct VersionRange {
    req: VersionReq,
    /// The original range string for display.
    raw: String,
}

impl VersionRange {
    /// Parse a version range.
    ///
    /// Accepts anything [`semver::VersionReq`] accepts plus `==` and
    /// operator/version whitespace. Empty input and `*` match any version.
    pub fn parse(range: &str) -> Result<Self> {
        let raw = range.trim().to_string();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::any());
        }

        let normalized = OPERATOR_GAP.replace_all(&raw, "$1").replace("==", "=");
        let req = VersionReq::parse(&normalized).map_err(|e| Error::InvalidRange {
            range: raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { req, raw })
    }

    /// A range matching every released version.
    pub fn any() -> Self {
        Self {
            req: VersionReq::STAR,
            raw: "*".to_string(),
        }
    }

    /// Whether `version` lies inside this range.
    pub fn matches(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Return the original range string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this range accepts any version.
    pub fn is_any(&self) -> bool {
        self.req == VersionReq::STAR
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionRange({:?})", self.raw)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VersionRange::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a version string, appending `.0` when only `major.minor` is given.
///
/// Anything else that is not valid semver is [`Error::UnparsableVersion`].
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    match Version::parse(trimmed) {
        Ok(v) => Ok(v),
        Err(source) => {
            if trimmed.matches('.').count() == 1 {
                if let Ok(v) = Version::parse(&format!("{trimmed}.0")) {
                    return Ok(v);
                }
            }
            Err(Error::UnparsableVersion {
                raw: raw.to_string(),
                source,
            })
        }
    }
}

/// Check whether `version` satisfies `range`.
pub fn satisfies(version: &Version, range: &VersionRange) -> bool {
    range.matches(version)
}

/// Compare two versions by semver precedence.
///
/// Build metadata does not take part in precedence; a pre-release sorts
/// below its release.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Pick the candidate with the highest version inside `range`.
///
/// Candidates are typically all installed versions of one extension name.
/// Returns `None` when no candidate satisfies the range.
pub fn highest_satisfying<'a, T, I>(candidates: I, range: &VersionRange) -> Option<&'a T>
where
    T: AsRef<Extension> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    candidates
        .into_iter()
        .filter(|c| range.matches(&c.as_ref().version))
        .max_by(|a, b| compare(&a.as_ref().version, &b.as_ref().version))
}
