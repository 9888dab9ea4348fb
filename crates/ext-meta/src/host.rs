//! Host components an extension can declare version ranges on.
//!
//! The framework and the frontend are provided by the host, not installed as
//! extensions, so ranges on them live in their own manifest table:
//!
//! ```toml
//! [extension.host]
//! framework = ">= 3.0.0"
//! frontend = "^1.4"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A component of the host an extension runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostComponent {
    Framework,
    Frontend,
}

impl HostComponent {
    pub const ALL: [Self; 2] = [Self::Framework, Self::Frontend];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::Frontend => "frontend",
        }
    }
}

impl fmt::Display for HostComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_deserialize_as_table_keys() {
        let table: BTreeMap<HostComponent, String> =
            toml::from_str("framework = \">= 3.0.0\"\nfrontend = \"^1\"\n").unwrap();
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), HostComponent::ALL.to_vec());
        assert!(toml::from_str::<BTreeMap<HostComponent, String>>("kernel = \"1\"").is_err());
    }
}
