//! The profile file: load order plus user values.
//!
//! ```toml
//! load-order = ["graphics@1.2.0", "maps@2.0.0"]
//!
//! [values]
//! "graphics.resolution" = 60
//! ```

use std::path::Path;

use ext_config::UserConfiguration;
use ext_meta::ExtensionId;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    /// Explicitly activated extensions as `name@version`.
    #[serde(default)]
    pub load_order: Vec<String>,

    #[serde(default)]
    pub values: UserConfiguration,
}

impl Profile {
    /// Read the profile at `path`; a missing file is an empty profile.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No profile, starting empty");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self)?;
        std::fs::write(path, content)?;
        tracing::info!(path = %path.display(), "Wrote profile");
        Ok(())
    }

    pub fn from_parts(explicit: &[ExtensionId], values: UserConfiguration) -> Self {
        Self {
            load_order: explicit.iter().map(ToString::to_string).collect(),
            values,
        }
    }

    /// The load order parsed into ids.
    pub fn explicit(&self) -> Result<Vec<ExtensionId>> {
        self.load_order
            .iter()
            .map(|s| s.parse::<ExtensionId>().map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ext_meta::ConfigValue;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_profile_is_empty() {
        let temp = TempDir::new().unwrap();
        let profile = Profile::load(&temp.path().join("profile.toml")).unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profile.toml");

        let mut values = UserConfiguration::new();
        values.set("graphics.x", ConfigValue::from(60));
        let ids = vec!["graphics@1.2.0".parse().unwrap()];
        Profile::from_parts(&ids, values).save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("load-order = [\"graphics@1.2.0\"]"));

        let loaded = Profile::load(&path).unwrap();
        assert_eq!(loaded.explicit().unwrap(), ids);
        assert_eq!(loaded.values.get("graphics.x"), Some(&ConfigValue::from(60)));
    }

    #[test]
    fn test_bad_id_in_load_order() {
        let profile: Profile = toml::from_str("load-order = [\"graphics\"]").unwrap();
        assert!(profile.explicit().is_err());
    }
}
